//! SVG markup optimization.
//!
//! [`Optimizer`] is the seam: the pipeline hands it raw markup and falls
//! back to that raw markup whenever it errors or produces nothing. The
//! built-in [`Minifier`] is a text-level minifier with individually
//! switchable passes; heavier optimizers can be plugged in through the
//! trait.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Errors an optimizer may report. The pipeline never propagates them.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OptimizeError {
    /// The input has no `<svg` element.
    #[error("input is not an SVG document")]
    NotSvg,

    /// Optimizer-specific failure.
    #[error("optimization failed: {0}")]
    Failed(String),
}

/// Passes run by the [`Minifier`]. All are enabled by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Remove the `<?xml …?>` declaration.
    pub remove_xml_declaration: bool,
    /// Remove `<!DOCTYPE …>`.
    pub remove_doctype: bool,
    /// Remove `<!-- … -->` comments.
    pub remove_comments: bool,
    /// Remove `<metadata>` elements.
    pub remove_metadata: bool,
    /// Remove `<title>` elements.
    pub remove_title: bool,
    /// Remove `<desc>` elements.
    pub remove_desc: bool,
    /// Drop whitespace between tags and trim the document.
    pub collapse_whitespace: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            remove_xml_declaration: true,
            remove_doctype: true,
            remove_comments: true,
            remove_metadata: true,
            remove_title: true,
            remove_desc: true,
            collapse_whitespace: true,
        }
    }
}

/// Whether and how to optimize icons.
///
/// Deserializes from `true` (default passes), `false` (no optimization),
/// or a table of [`OptimizerConfig`] switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OptimizationRepr", into = "OptimizationRepr")]
pub enum Optimization {
    /// Use icons exactly as read.
    Disabled,
    /// Run the optimizer with this configuration.
    Enabled(OptimizerConfig),
}

impl Default for Optimization {
    fn default() -> Self {
        Self::Enabled(OptimizerConfig::default())
    }
}

impl Optimization {
    /// The optimizer configuration, or `None` when disabled.
    #[must_use]
    pub fn config(&self) -> Option<&OptimizerConfig> {
        match self {
            Self::Disabled => None,
            Self::Enabled(config) => Some(config),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum OptimizationRepr {
    Toggle(bool),
    Custom(OptimizerConfig),
}

impl From<OptimizationRepr> for Optimization {
    fn from(repr: OptimizationRepr) -> Self {
        match repr {
            OptimizationRepr::Toggle(false) => Self::Disabled,
            OptimizationRepr::Toggle(true) => Self::default(),
            OptimizationRepr::Custom(config) => Self::Enabled(config),
        }
    }
}

impl From<Optimization> for OptimizationRepr {
    fn from(value: Optimization) -> Self {
        match value {
            Optimization::Disabled => Self::Toggle(false),
            Optimization::Enabled(config) if config == OptimizerConfig::default() => {
                Self::Toggle(true)
            }
            Optimization::Enabled(config) => Self::Custom(config),
        }
    }
}

/// Markup optimizer seam.
pub trait Optimizer {
    /// Optimize `markup` according to `config`.
    fn optimize(&self, markup: &str, config: &OptimizerConfig) -> Result<String, OptimizeError>;
}

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect("optimizer pattern is valid"));
    };
}

pattern!(XML_DECLARATION, r"(?s)<\?xml.*?\?>");
pattern!(DOCTYPE, r"(?is)<!DOCTYPE[^>\[]*(\[.*?\])?\s*>");
pattern!(COMMENT, r"(?s)<!--.*?-->");
pattern!(METADATA, r"(?s)<metadata\b[^>]*/>|<metadata\b[^>]*>.*?</metadata>");
pattern!(TITLE, r"(?s)<title\b[^>]*/>|<title\b[^>]*>.*?</title>");
pattern!(DESC, r"(?s)<desc\b[^>]*/>|<desc\b[^>]*>.*?</desc>");
pattern!(INTER_TAG_SPACE, r">\s+<");
pattern!(TEXT_ELEMENT, r"(?s)<text\b[^>]*/>|<text\b.*?</text>");

/// Drop whitespace between tags, leaving `<text>` content untouched.
fn collapse_inter_tag_space(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut last = 0;
    // Segments keep the `<` opening and the `>` closing a text element so
    // whitespace around it still collapses.
    for text in TEXT_ELEMENT.find_iter(markup) {
        out.push_str(&INTER_TAG_SPACE.replace_all(&markup[last..=text.start()], "><"));
        out.push_str(&markup[text.start() + 1..text.end() - 1]);
        last = text.end() - 1;
    }
    out.push_str(&INTER_TAG_SPACE.replace_all(&markup[last..], "><"));
    out.trim().to_string()
}

/// Regex-driven SVG minifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minifier;

impl Minifier {
    /// Create a minifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Optimizer for Minifier {
    fn optimize(&self, markup: &str, config: &OptimizerConfig) -> Result<String, OptimizeError> {
        if !markup.contains("<svg") {
            return Err(OptimizeError::NotSvg);
        }

        let mut out = markup.to_string();
        let passes: [(bool, &Regex); 6] = [
            (config.remove_xml_declaration, &*XML_DECLARATION),
            (config.remove_doctype, &*DOCTYPE),
            (config.remove_comments, &*COMMENT),
            (config.remove_metadata, &*METADATA),
            (config.remove_title, &*TITLE),
            (config.remove_desc, &*DESC),
        ];
        for (enabled, re) in passes {
            if enabled {
                out = re.replace_all(&out, "").into_owned();
            }
        }
        if config.collapse_whitespace {
            out = collapse_inter_tag_space(&out);
        }

        Ok(out)
    }
}
