//! Stripping of development-only blocks from `MODULE.bazel`.
//!
//! A block starts at [`START_MARKER`] and runs through the nearest following
//! [`END_MARKER`]. Every block is removed together with the newlines directly
//! around it. When the block sat between two lines, a single line break is
//! kept so the neighbouring lines are not glued together.
//!
//! ```text
//! bazel_dep(name = "abseil-cpp", version = "20250127.0")
//!
//! ## :- START ~ DEVELOPMENT DEPENDENCIES -: ##
//! bazel_dep(name = "googletest", version = "1.16.0", dev_dependency = True)
//! ## :- END ~ DEVELOPMENT DEPENDENCIES -: ##
//! ```

/// Marker opening a development-only block.
pub const START_MARKER: &str = "## :- START ~ DEVELOPMENT DEPENDENCIES -: ##";

/// Marker closing a development-only block.
pub const END_MARKER: &str = "## :- END ~ DEVELOPMENT DEPENDENCIES -: ##";

/// Removes delimited blocks from manifest text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRewriter {
    start: String,
    end: String,
}

impl Default for ManifestRewriter {
    fn default() -> Self {
        ManifestRewriter::new(START_MARKER, END_MARKER)
    }
}

impl ManifestRewriter {
    /// Create a rewriter for custom markers.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        ManifestRewriter {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Remove every complete block from `text`.
    ///
    /// An unterminated start marker is left untouched, along with everything
    /// after it.
    pub fn rewrite(&self, text: &str) -> String {
        self.strip(text).0
    }

    /// Count the blocks [`rewrite`](Self::rewrite) removes from `text`.
    pub fn count_blocks(&self, text: &str) -> usize {
        self.strip(text).1
    }

    /// Rewrite and count removed blocks in one go.
    ///
    /// Passes repeat until the text stops changing: removing a block can join
    /// the two halves of a marker split around it into a new block.
    pub fn strip(&self, text: &str) -> (String, usize) {
        if self.start.is_empty() || self.end.is_empty() {
            return (text.to_string(), 0);
        }

        let mut text = text.to_string();
        let mut total = 0;
        loop {
            let (next, removed) = self.pass(&text);
            if removed == 0 {
                return (text, total);
            }
            total += removed;
            text = next;
        }
    }

    /// One left-to-right scan over `text`.
    fn pass(&self, text: &str) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut removed = 0;

        while let Some(start) = rest.find(&self.start) {
            let body = start + self.start.len();
            let Some(end) = rest[body..].find(&self.end) else {
                break;
            };
            let end = body + end + self.end.len();

            out.push_str(&rest[..start]);
            let lead = out.len() - out.trim_end_matches('\n').len();
            out.truncate(out.len() - lead);

            let tail = rest[end..].trim_start_matches('\n');
            let trail = rest.len() - end - tail.len();

            if !out.is_empty() && lead + trail > 0 {
                out.push('\n');
            }

            removed += 1;
            rest = tail;
        }

        out.push_str(rest);
        (out, removed)
    }
}

/// Strip development blocks using the default markers.
pub fn rewrite(text: &str) -> String {
    ManifestRewriter::default().rewrite(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(body: &str) -> String {
        format!("{START_MARKER}\n{body}\n{END_MARKER}")
    }

    #[test]
    fn test_no_markers_is_unchanged() {
        let text = "module(name = \"violet\")\n\nbazel_dep(name = \"fmt\")\n";
        assert_eq!(rewrite(text), text);
    }

    #[test]
    fn test_removes_single_block_with_padding() {
        let text = format!(
            "module(name = \"violet\")\n\n{}\n\nbazel_dep(name = \"fmt\")\n",
            block("bazel_dep(name = \"googletest\", dev_dependency = True)")
        );
        assert_eq!(
            rewrite(&text),
            "module(name = \"violet\")\nbazel_dep(name = \"fmt\")\n"
        );
    }

    #[test]
    fn test_removes_trailing_block() {
        let text = format!(
            "module(name = \"violet\")\n\n{}\n",
            block("bazel_dep(name = \"rules_python\")")
        );
        assert_eq!(rewrite(&text), "module(name = \"violet\")\n");
    }

    #[test]
    fn test_removes_leading_block() {
        let text = format!("{}\n\nmodule(name = \"violet\")\n", block("x"));
        assert_eq!(rewrite(&text), "module(name = \"violet\")\n");
    }

    #[test]
    fn test_removes_all_blocks() {
        let text = format!(
            "a\n\n{}\n\nb\n{}\nc\n\n{}\n",
            block("one"),
            block("two\nlines"),
            block("three")
        );
        let out = rewrite(&text);
        assert_eq!(out, "a\nb\nc\n");
        assert!(!out.contains(START_MARKER));
        assert_eq!(ManifestRewriter::default().count_blocks(&text), 3);
    }

    #[test]
    fn test_adjacent_blocks_collapse() {
        let text = format!("a\n{}\n{}\nb", block("one"), block("two"));
        assert_eq!(rewrite(&text), "a\nb");
    }

    #[test]
    fn test_nearest_end_marker_wins() {
        let text = format!("a\n{}\nkeep\n{}\n", block("one"), END_MARKER);
        assert_eq!(rewrite(&text), format!("a\nkeep\n{END_MARKER}\n"));
    }

    #[test]
    fn test_unterminated_block_is_left_alone() {
        let text = format!("a\n{START_MARKER}\nbazel_dep(name = \"x\")\n");
        assert_eq!(rewrite(&text), text);
        assert_eq!(ManifestRewriter::default().count_blocks(&text), 0);
    }

    #[test]
    fn test_terminated_then_unterminated() {
        let text = format!("a\n{}\nb\n{START_MARKER}\nc\n", block("one"));
        assert_eq!(rewrite(&text), format!("a\nb\n{START_MARKER}\nc\n"));
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let inputs = [
            "plain\n".to_string(),
            format!("a\n\n{}\n\nb\n", block("x")),
            format!("{}\n{START_MARKER}\ntail\n", block("x")),
            format!("a{}b", block("inline")),
        ];

        for input in inputs {
            let once = rewrite(&input);
            assert_eq!(rewrite(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_block_splitting_a_marker_is_rescanned() {
        let (head, tail) = START_MARKER.split_at(10);
        let text = format!("{head}{}{tail}\nbody\n{END_MARKER}", block("x"));

        let once = rewrite(&text);
        assert_eq!(once, "");
        assert!(!once.contains(START_MARKER));
        assert_eq!(rewrite(&once), once);
        assert_eq!(ManifestRewriter::default().count_blocks(&text), 2);
    }

    #[test]
    fn test_inline_block_joins_without_newline() {
        let text = format!("x = [{}]\n", block("dev"));
        assert_eq!(rewrite(&text), "x = []\n");
    }

    #[test]
    fn test_custom_markers() {
        let rewriter = ManifestRewriter::new("# BEGIN DEV", "# END DEV");
        let text = "a\n# BEGIN DEV\nb\n# END DEV\nc\n";
        assert_eq!(rewriter.rewrite(text), "a\nc\n");
    }

    #[test]
    fn test_empty_markers_never_match() {
        let rewriter = ManifestRewriter::new("", "");
        assert_eq!(rewriter.rewrite("a\nb\n"), "a\nb\n");
        assert_eq!(rewriter.count_blocks("a\nb\n"), 0);
    }
}
