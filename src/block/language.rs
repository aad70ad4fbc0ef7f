//! Code block language names.
//!
//! Notion rejects a code block whose `language` is outside its fixed
//! enumeration, so free-form labels scraped from the page are mapped onto
//! it before upload.

/// Language used when the label is missing or unknown.
pub const PLAIN_TEXT: &str = "plain text";

const NOTION_LANGUAGES: &[&str] = &[
    "abap",
    "arduino",
    "bash",
    "basic",
    "c",
    "clojure",
    "coffeescript",
    "c++",
    "c#",
    "css",
    "dart",
    "diff",
    "docker",
    "elixir",
    "elm",
    "erlang",
    "flow",
    "fortran",
    "f#",
    "gherkin",
    "glsl",
    "go",
    "graphql",
    "groovy",
    "haskell",
    "html",
    "java",
    "javascript",
    "json",
    "julia",
    "kotlin",
    "latex",
    "less",
    "lisp",
    "livescript",
    "lua",
    "makefile",
    "markdown",
    "markup",
    "matlab",
    "mermaid",
    "nix",
    "objective-c",
    "ocaml",
    "pascal",
    "perl",
    "php",
    "plain text",
    "powershell",
    "prolog",
    "protobuf",
    "python",
    "r",
    "reason",
    "ruby",
    "rust",
    "sass",
    "scala",
    "scheme",
    "scss",
    "shell",
    "solidity",
    "sql",
    "swift",
    "typescript",
    "vb.net",
    "verilog",
    "vhdl",
    "visual basic",
    "webassembly",
    "xml",
    "yaml",
];

const ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "javascript"),
    ("mjs", "javascript"),
    ("node", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("py", "python"),
    ("python3", "python"),
    ("rs", "rust"),
    ("sh", "shell"),
    ("zsh", "shell"),
    ("console", "shell"),
    ("shellscript", "shell"),
    ("ps1", "powershell"),
    ("pwsh", "powershell"),
    ("cpp", "c++"),
    ("cxx", "c++"),
    ("hpp", "c++"),
    ("h", "c"),
    ("cs", "c#"),
    ("csharp", "c#"),
    ("fsharp", "f#"),
    ("golang", "go"),
    ("kt", "kotlin"),
    ("rb", "ruby"),
    ("objc", "objective-c"),
    ("objectivec", "objective-c"),
    ("yml", "yaml"),
    ("md", "markdown"),
    ("tex", "latex"),
    ("make", "makefile"),
    ("dockerfile", "docker"),
    ("proto", "protobuf"),
    ("wasm", "webassembly"),
    ("vb", "visual basic"),
    ("vbnet", "vb.net"),
    ("jsonc", "json"),
    ("xhtml", "html"),
    ("svg", "xml"),
    ("text", PLAIN_TEXT),
    ("txt", PLAIN_TEXT),
    ("plaintext", PLAIN_TEXT),
];

/// Map a scraped language label onto Notion's language names.
///
/// Matching is case-insensitive and ignores surrounding whitespace.
/// Unknown labels map to [`PLAIN_TEXT`].
pub fn notion_language(label: &str) -> &'static str {
    let label = label.trim().to_lowercase();

    if let Some(known) = NOTION_LANGUAGES.iter().copied().find(|&name| name == label) {
        return known;
    }

    ALIASES
        .iter()
        .find(|(alias, _)| *alias == label)
        .map(|(_, target)| *target)
        .unwrap_or(PLAIN_TEXT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_languages_pass_through() {
        assert_eq!(notion_language("rust"), "rust");
        assert_eq!(notion_language("Python"), "python");
        assert_eq!(notion_language(" c++ "), "c++");
        assert_eq!(notion_language("plain text"), PLAIN_TEXT);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(notion_language("js"), "javascript");
        assert_eq!(notion_language("TSX"), "typescript");
        assert_eq!(notion_language("sh"), "shell");
        assert_eq!(notion_language("cpp"), "c++");
    }

    #[test]
    fn test_unknown_is_plain_text() {
        assert_eq!(notion_language(""), PLAIN_TEXT);
        assert_eq!(notion_language("brainfuck"), PLAIN_TEXT);
    }

    #[test]
    fn test_every_alias_targets_a_notion_language() {
        for (alias, target) in ALIASES {
            assert!(NOTION_LANGUAGES.contains(target), "{alias} -> {target}");
        }
    }
}
