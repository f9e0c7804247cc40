//! Concatenate script sources into one IIFE-wrapped unit.

use std::path::{Path, PathBuf};

const PROLOGUE: &str = "(function () {\n";
const EPILOGUE: &str = "})();\n";

/// One input file's line range inside the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    path: PathBuf,
    /// 1-based bundle line of the file's first line.
    start_line: usize,
    line_count: usize,
}

/// Concatenated source plus per-file line offsets.
#[derive(Debug)]
pub struct Bundle {
    pub code: String,
    segments: Vec<Segment>,
}

impl Bundle {
    /// Join `(path, source)` pairs in the given order.
    pub fn concat<P: AsRef<Path>, S: AsRef<str>>(sources: &[(P, S)]) -> Self {
        let mut code = String::from(PROLOGUE);
        let mut line = 1 + PROLOGUE.matches('\n').count();
        let mut segments = Vec::with_capacity(sources.len());

        for (path, source) in sources {
            let source = source.as_ref();
            code.push_str(source);
            if !source.ends_with('\n') {
                code.push('\n');
            }

            let line_count = source.lines().count().max(1);
            segments.push(Segment {
                path: path.as_ref().to_path_buf(),
                start_line: line,
                line_count,
            });
            line += line_count;
        }

        code.push_str(EPILOGUE);
        Self { code, segments }
    }

    pub fn file_count(&self) -> usize {
        self.segments.len()
    }

    /// Map a byte offset in the bundle to `(file, 1-based line)`.
    ///
    /// Offsets inside the IIFE wrapper map to nothing.
    pub fn locate(&self, offset: u32) -> Option<(&Path, usize)> {
        let offset = (offset as usize).min(self.code.len());
        let line = self.code.as_bytes()[..offset]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;

        self.segments
            .iter()
            .find(|s| line >= s.start_line && line < s.start_line + s.line_count)
            .map(|s| (s.path.as_path(), line - s.start_line + 1))
    }
}
