//! `::code` directive: inline a labelled region of a code sample.
//!
//! ```text
//! ::code[map_reduce_0_0]{lang="csharp" file="Indexes/MapReduceIndexes.cs" version="5.1"}
//! ```
//!
//! The sample resolves to `<docs root>/<version>/<samples dir of lang>/<file>`.
//! The region is delimited by `#region <label>` and `#endregion` markers
//! (`// region` and `# region` work too). Without a label the whole file is
//! inlined.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::directive::{DirectiveArgs, DirectiveContext, DirectiveOutput, LeafDirective};
use crate::fence::fenced_code;

static REGION_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:#|//\s*#?)\s*region\b\s*(?P<label>\S*)").unwrap()
});

static REGION_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:#|//\s*#?)\s*endregion\b").unwrap());

/// Where the samples of one language live and how they are fenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLanguage {
    /// Samples directory, relative to a version directory.
    pub dir: String,
    /// Info string of the emitted code fence.
    pub fence: String,
}

/// Region lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("region '{0}' not found")]
    NotFound(String),
    #[error("region '{label}' opened on line {line} is never closed")]
    Unclosed { label: String, line: usize },
}

/// Extract the body of region `label`, dedented, without nested markers.
pub fn extract_region(source: &str, label: &str) -> Result<String, RegionError> {
    let mut lines = source.lines().enumerate();

    let start_line = lines
        .by_ref()
        .find(|(_, line)| {
            REGION_START_RE
                .captures(line)
                .is_some_and(|caps| &caps["label"] == label)
        })
        .map(|(idx, _)| idx + 1)
        .ok_or_else(|| RegionError::NotFound(label.to_owned()))?;

    let mut body = Vec::new();
    let mut depth = 1usize;
    for (_, line) in lines {
        if REGION_START_RE.is_match(line) {
            depth += 1;
        } else if REGION_END_RE.is_match(line) {
            depth -= 1;
            if depth == 0 {
                return Ok(dedent(&body));
            }
        } else {
            body.push(line);
        }
    }

    Err(RegionError::Unclosed {
        label: label.to_owned(),
        line: start_line,
    })
}

/// Strip the common leading whitespace and surrounding blank lines.
fn dedent(lines: &[&str]) -> String {
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return String::new();
    };
    let lines = &lines[first..=last];

    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut out = String::new();
    for line in lines {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(line[indent..].trim_end());
            out.push('\n');
        }
    }
    out
}

/// Handler for `::code`.
pub struct CodeSampleDirective {
    languages: BTreeMap<String, SampleLanguage>,
    default_version: String,
    warnings: Vec<String>,
}

impl CodeSampleDirective {
    /// `default_version` applies to references without a `version` attribute.
    #[must_use]
    pub fn new(languages: BTreeMap<String, SampleLanguage>, default_version: impl Into<String>) -> Self {
        Self {
            languages,
            default_version: default_version.into(),
            warnings: Vec::new(),
        }
    }

    fn inline(&self, args: &DirectiveArgs, ctx: &DirectiveContext) -> Result<String, String> {
        let lang = args.require("lang")?;
        let file = args.require("file")?;
        let version = args.get("version").unwrap_or(&self.default_version);
        let language = self
            .languages
            .get(lang)
            .ok_or_else(|| format!("no samples directory configured for language '{lang}'"))?;

        let relative = format!("{version}/{}/{file}", language.dir.trim_matches('/'));
        let path = ctx
            .resolve_path_safe(&relative)
            .ok_or_else(|| format!("sample file '{relative}' not found"))?;
        let source = ctx
            .read(&path)
            .map_err(|e| format!("cannot read sample file '{relative}': {e}"))?;
        let source = source.trim_start_matches('\u{feff}');

        let code = if args.content.is_empty() {
            dedent(&source.lines().collect::<Vec<_>>())
        } else {
            extract_region(source, &args.content).map_err(|e| format!("{relative}: {e}"))?
        };
        Ok(fenced_code(&language.fence, &code))
    }
}

impl LeafDirective for CodeSampleDirective {
    fn name(&self) -> &'static str {
        "code"
    }

    fn process(&mut self, args: DirectiveArgs, ctx: &DirectiveContext) -> DirectiveOutput {
        match self.inline(&args, ctx) {
            Ok(markdown) => DirectiveOutput::markdown(markdown),
            Err(message) => {
                self.warnings.push(format!("{}: {message}", ctx.location()));
                DirectiveOutput::Skip
            }
        }
    }

    fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\u{feff}namespace Samples
{
    #region orders_0
    public class Orders
    {
        #region orders_1
        public string Id { get; set; }
        #endregion
    }
    #endregion

    #region empty
    #endregion
}
";

    #[test]
    fn test_extract_region_dedents_and_drops_nested_markers() {
        let code = extract_region(SAMPLE, "orders_0").unwrap();
        assert_eq!(
            code,
            "public class Orders\n{\n    public string Id { get; set; }\n}\n"
        );
    }

    #[test]
    fn test_extract_nested_region() {
        let code = extract_region(SAMPLE, "orders_1").unwrap();
        assert_eq!(code, "public string Id { get; set; }\n");
    }

    #[test]
    fn test_extract_empty_region() {
        assert_eq!(extract_region(SAMPLE, "empty").unwrap(), "");
    }

    #[test]
    fn test_comment_marker_styles() {
        let js = "// #region query\nconst q = 1;\n// #endregion";
        assert_eq!(extract_region(js, "query").unwrap(), "const q = 1;\n");

        let py = "    # region query\n    q = 1\n\n    r = 2\n    # endregion";
        assert_eq!(extract_region(py, "query").unwrap(), "q = 1\n\nr = 2\n");
    }

    #[test]
    fn test_label_must_match_exactly() {
        assert_eq!(
            extract_region(SAMPLE, "orders"),
            Err(RegionError::NotFound("orders".to_owned()))
        );
    }

    #[test]
    fn test_unclosed_region() {
        assert_eq!(
            extract_region("x\n#region a\ncode", "a"),
            Err(RegionError::Unclosed {
                label: "a".to_owned(),
                line: 2
            })
        );
    }

    fn languages() -> BTreeMap<String, SampleLanguage> {
        BTreeMap::from([(
            "csharp".to_owned(),
            SampleLanguage {
                dir: "Samples/csharp".to_owned(),
                fence: "csharp".to_owned(),
            },
        )])
    }

    fn process(docs_root: &Path, line: &str) -> (DirectiveOutput, Vec<String>) {
        let mut directive = CodeSampleDirective::new(languages(), "5.1");
        let ctx = DirectiveContext {
            source_path: Some(Path::new("indexes.markdown")),
            base_dir: docs_root,
            line: 7,
            read_file: &|path| fs::read_to_string(path),
        };
        let Some(crate::directive::parser::ParsedDirective::Leaf { args, .. }) =
            crate::directive::parser::parse_block_line(line)
        else {
            panic!("not a leaf directive: {line}");
        };
        let output = directive.process(args, &ctx);
        (output, directive.warnings().to_vec())
    }

    fn docs_root() -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("5.1/Samples/csharp/Indexes");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Orders.cs"), SAMPLE).unwrap();
        temp_dir
    }

    #[test]
    fn test_directive_inlines_region() {
        let root = docs_root();
        let (output, warnings) = process(
            root.path(),
            r#"::code[orders_1]{lang="csharp" file="Indexes/Orders.cs"}"#,
        );
        assert_eq!(
            output,
            DirectiveOutput::markdown("```csharp\npublic string Id { get; set; }\n```")
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_directive_missing_file() {
        let root = docs_root();
        let (output, warnings) = process(
            root.path(),
            r#"::code[a]{lang="csharp" file="Missing.cs" version="4.2"}"#,
        );
        assert_eq!(output, DirectiveOutput::Skip);
        assert_eq!(
            warnings,
            vec!["indexes.markdown:7: sample file '4.2/Samples/csharp/Missing.cs' not found"]
        );
    }

    #[test]
    fn test_directive_unknown_language_and_region() {
        let root = docs_root();
        let (_, warnings) = process(root.path(), r#"::code[a]{lang="cobol" file="x.cbl"}"#);
        assert_eq!(
            warnings,
            vec!["indexes.markdown:7: no samples directory configured for language 'cobol'"]
        );

        let (_, warnings) = process(
            root.path(),
            r#"::code[nope]{lang="csharp" file="Indexes/Orders.cs"}"#,
        );
        assert_eq!(
            warnings,
            vec![
                "indexes.markdown:7: 5.1/Samples/csharp/Indexes/Orders.cs: region 'nope' not found"
            ]
        );
    }

    #[test]
    fn test_directive_missing_attribute() {
        let root = docs_root();
        let (_, warnings) = process(root.path(), "::code[a]{lang=csharp}");
        assert_eq!(
            warnings,
            vec!["indexes.markdown:7: missing required attribute 'file'"]
        );
    }
}
