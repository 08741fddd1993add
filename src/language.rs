//! File extension to highlighting language lookup
//!
//! Shared by the editor and result views. The identifiers follow the
//! Monaco editor's language ids so stored data stays comparable with the
//! web client.

/// Language used when the extension is unknown or the file has no name.
pub const PLAIN_TEXT: &str = "plaintext";

/// Static extension table. Extensions are lowercase.
const LANGUAGES: &[(&[&str], &str)] = &[
    (&["abap"], "abap"),
    (&["cls"], "apex"),
    (&["azcli"], "azcli"),
    (&["bat", "cmd"], "bat"),
    (&["bicep"], "bicep"),
    (&["mligo"], "cameligo"),
    (&["clj", "cljs", "cljc", "edn"], "clojure"),
    (&["coffee"], "coffeescript"),
    (&["c"], "c"),
    (&["cpp", "cc", "cxx", "hpp", "hh"], "cpp"),
    (&["cs", "csx"], "csharp"),
    (&["csp"], "csp"),
    (&["css"], "css"),
    (&["cyp", "cypher"], "cypher"),
    (&["dart"], "dart"),
    (&["dockerfile"], "dockerfile"),
    (&["ecl"], "ecl"),
    (&["ex", "exs"], "elixir"),
    (&["flow"], "flow9"),
    (&["fs", "fsi", "fsx", "fsscript"], "fsharp"),
    (&["ftl"], "freemarker2"),
    (&["go"], "go"),
    (&["graphql", "gql"], "graphql"),
    (&["hbs"], "handlebars"),
    (&["hcl", "tf"], "hcl"),
    (&["htm", "html"], "html"),
    (&["ini", "cfg", "conf"], "ini"),
    (&["java"], "java"),
    (&["js", "mjs", "cjs"], "javascript"),
    (&["jl"], "julia"),
    (&["kt", "kts"], "kotlin"),
    (&["less"], "less"),
    (&["lexon"], "lexon"),
    (&["lua"], "lua"),
    (&["liquid"], "liquid"),
    (&["m3"], "m3"),
    (&["md", "markdown"], "markdown"),
    (&["mdx"], "mdx"),
    (&["s", "asm"], "mips"),
    (&["dax"], "msdax"),
    (&["sql"], "sql"),
    (&["mysql"], "mysql"),
    (&["m"], "objective-c"),
    (&["pas", "pp"], "pascal"),
    (&["ligo"], "pascaligo"),
    (&["pl", "pm"], "perl"),
    (&["pgsql"], "pgsql"),
    (&["php", "phtml"], "php"),
    (&["p"], "pla"),
    (&["dats", "sats", "hats"], "postiats"),
    (&["pq", "pqm"], "powerquery"),
    (&["ps1", "psm1", "psd1"], "powershell"),
    (&["proto"], "proto"),
    (&["pug"], "pug"),
    (&["py", "pyw"], "python"),
    (&["qs"], "qsharp"),
    (&["r"], "r"),
    (&["razor"], "razor"),
    (&["redis"], "redis"),
    (&["redshift"], "redshift"),
    (&["rst"], "restructuredtext"),
    (&["rb", "erb", "rake"], "ruby"),
    (&["rs"], "rust"),
    (&["sb"], "sb"),
    (&["scala", "sc"], "scala"),
    (&["scm", "ss"], "scheme"),
    (&["scss"], "scss"),
    (&["sh", "bash"], "shell"),
    (&["sol"], "sol"),
    (&["aes"], "aes"),
    (&["sparql"], "sparql"),
    (&["st"], "st"),
    (&["swift"], "swift"),
    (&["sv", "svh"], "systemverilog"),
    (&["v"], "verilog"),
    (&["tcl"], "tcl"),
    (&["twig"], "twig"),
    (&["ts", "mts"], "typescript"),
    (&["tsp"], "typespec"),
    (&["vb"], "vb"),
    (&["wgsl"], "wgsl"),
    (&["xml", "svg"], "xml"),
    (&["yaml", "yml"], "yaml"),
    (&["json"], "json"),
];

/// Extension of a file name: the text after the last `.`, or the whole
/// name when there is no dot, lowercased.
fn extension_of(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_lowercase()
}

/// Resolve the highlighting language for a file name.
pub fn language_for(name: Option<&str>) -> &'static str {
    let Some(name) = name else {
        return PLAIN_TEXT;
    };
    let ext = extension_of(name);
    if ext.is_empty() {
        return PLAIN_TEXT;
    }

    LANGUAGES
        .iter()
        .find(|(exts, _)| exts.contains(&ext.as_str()))
        .map(|(_, lang)| *lang)
        .unwrap_or(PLAIN_TEXT)
}
