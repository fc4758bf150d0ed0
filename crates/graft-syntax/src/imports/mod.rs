//! Import block parsing and insertion.
//!
//! An [`ImportBlock`] is the ordered list of top-level `use` and
//! `extern crate` declarations in a Rust file. Editing never re-renders the
//! block: a new import is spliced in as one extra line after the last
//! existing declaration, so comments, attributes and formatting elsewhere in
//! the file are untouched.

use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::error::ImportEditError;
use crate::parser::{ParseResult, Parser};

const USE_DECLARATION: &str = "use_declaration";
const EXTERN_CRATE_DECLARATION: &str = "extern_crate_declaration";
const USE_AS_CLAUSE: &str = "use_as_clause";

/// One top-level import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    path: String,
    alias: Option<String>,
    byte_range: Range<usize>,
}

impl ImportRecord {
    /// Returns the imported path with whitespace and any leading `::`
    /// removed.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the `as` alias, if the declaration has one.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Returns the byte range of the whole declaration.
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.byte_range.clone()
    }
}

/// Ordered top-level imports of a Rust source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBlock {
    records: Vec<ImportRecord>,
    anchor_end: usize,
}

impl ImportBlock {
    /// Parses the import block of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportEditError::MissingImportBlock`] when the file has no
    /// top-level imports and [`ImportEditError::MalformedImportBlock`] when a
    /// syntax error starts at or before the end of the last import.
    pub fn parse(source: &str) -> Result<Self, ImportEditError> {
        let mut parser = Parser::new()?;
        let parsed = parser.parse(source)?;
        Self::from_parse(&parsed)
    }

    fn from_parse(parsed: &ParseResult) -> Result<Self, ImportEditError> {
        let root = parsed.root_node();
        let mut records = Vec::new();
        let mut last_import_end = 0;
        let mut first_item_start = None;
        // Comments sharing a line with the last import stay ahead of the
        // inserted line, even when they span several lines.
        let mut anchor_end = 0;
        let mut anchor_row = None;

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            if matches!(node.kind(), USE_DECLARATION | EXTERN_CRATE_DECLARATION) {
                last_import_end = node.end_byte();
                anchor_end = node.end_byte();
                anchor_row = Some(node.end_position().row);
                if let Some(record) = record_from_node(parsed, node) {
                    records.push(record);
                }
                continue;
            }

            if is_comment(node) && anchor_row == Some(node.start_position().row) {
                anchor_end = anchor_end.max(node.end_byte());
                anchor_row =
                    (!parsed.node_text(node).ends_with('\n')).then_some(node.end_position().row);
            }
            if first_item_start.is_none() && !is_preamble(node) {
                first_item_start = Some(node.start_byte());
            }
        }

        // The import region runs to the last import or, when broken imports
        // hide inside ERROR nodes, to the first ordinary item.
        let region_end = last_import_end.max(first_item_start.unwrap_or(parsed.source().len()));
        if let Some(error) = parsed
            .errors()
            .into_iter()
            .find(|error| error.byte_range.start <= region_end)
        {
            return Err(ImportEditError::MalformedImportBlock {
                line: error.line,
                column: error.column,
                context: error.context,
            });
        }

        if records.is_empty() {
            return Err(ImportEditError::MissingImportBlock);
        }

        Ok(Self {
            records,
            anchor_end,
        })
    }

    /// Returns the declarations in source order.
    #[must_use]
    pub fn records(&self) -> &[ImportRecord] {
        &self.records
    }

    /// Returns the imported paths in source order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(ImportRecord::path)
    }

    /// Returns whether some declaration imports exactly `import_path`.
    #[must_use]
    pub fn contains(&self, import_path: &str) -> bool {
        let wanted = normalise_path(import_path);
        self.records.iter().any(|record| record.path == wanted)
    }

    fn last(&self) -> Option<&ImportRecord> {
        self.records.last()
    }
}

/// Outcome of [`ensure_import_in`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEdit {
    output: String,
    changed: bool,
}

impl ImportEdit {
    /// Returns the full source after the edit.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Returns whether an import was inserted.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.changed
    }

    /// Consumes the edit and returns the source text.
    #[must_use]
    pub fn into_output(self) -> String {
        self.output
    }
}

/// Ensures `source` imports `import_path`, inserting `use <path> as _;` when
/// it does not.
///
/// # Errors
///
/// Returns an error when `import_path` is not a Rust path or when the import
/// block is missing or malformed.
pub fn ensure_import_in(source: &str, import_path: &str) -> Result<ImportEdit, ImportEditError> {
    validate_import_path(import_path)?;
    let block = ImportBlock::parse(source)?;

    if block.contains(import_path) {
        return Ok(ImportEdit {
            output: source.to_owned(),
            changed: false,
        });
    }

    let anchor = block.last().ok_or(ImportEditError::MissingImportBlock)?;
    Ok(ImportEdit {
        output: insert_after(source, anchor.byte_range.start, block.anchor_end, import_path),
        changed: true,
    })
}

/// File-level front end for [`ensure_import_in`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportEditor;

impl ImportEditor {
    /// Creates an editor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reads `path` and parses its import block without editing it.
    ///
    /// # Errors
    ///
    /// Returns [`ImportEditError::Read`] when the file cannot be read, or any
    /// error from [`ImportBlock::parse`].
    pub fn inspect(&self, path: &Path) -> Result<ImportBlock, ImportEditError> {
        let source = read_source(path)?;
        ImportBlock::parse(&source)
    }

    /// Ensures the file at `path` imports `import_path`.
    ///
    /// The file is rewritten only when an import was inserted. Returns
    /// whether it changed.
    ///
    /// # Errors
    ///
    /// Returns read and write failures alongside the errors of
    /// [`ensure_import_in`].
    pub fn ensure_import(&self, path: &Path, import_path: &str) -> Result<bool, ImportEditError> {
        let source = read_source(path)?;
        let edit = ensure_import_in(&source, import_path)?;
        if edit.changed() {
            fs::write(path, edit.output()).map_err(|source| ImportEditError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Ok(edit.changed())
    }
}

fn read_source(path: &Path) -> Result<String, ImportEditError> {
    fs::read_to_string(path).map_err(|source| ImportEditError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn record_from_node(parsed: &ParseResult, node: tree_sitter::Node<'_>) -> Option<ImportRecord> {
    let (path_node, alias_node) = if node.kind() == USE_DECLARATION {
        let argument = node.child_by_field_name("argument")?;
        if argument.kind() == USE_AS_CLAUSE {
            (
                argument.child_by_field_name("path")?,
                argument.child_by_field_name("alias"),
            )
        } else {
            (argument, None)
        }
    } else {
        (
            node.child_by_field_name("name")?,
            node.child_by_field_name("alias"),
        )
    };

    Some(ImportRecord {
        path: normalise_path(parsed.node_text(path_node)),
        alias: alias_node.map(|alias| parsed.node_text(alias).to_owned()),
        byte_range: node.byte_range(),
    })
}

fn is_comment(node: tree_sitter::Node<'_>) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

fn is_preamble(node: tree_sitter::Node<'_>) -> bool {
    node.is_error()
        || is_comment(node)
        || matches!(node.kind(), "attribute_item" | "inner_attribute_item")
}

fn normalise_path(path: &str) -> String {
    let compact: String = path.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .strip_prefix("::")
        .map_or_else(|| compact.clone(), str::to_owned)
}

fn validate_import_path(import_path: &str) -> Result<(), ImportEditError> {
    let valid = !import_path.is_empty() && import_path.split("::").all(is_identifier);
    if valid {
        Ok(())
    } else {
        Err(ImportEditError::InvalidImportPath {
            import_path: import_path.to_owned(),
        })
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splices `use <import_path> as _;` onto a new line after the line on which
/// the anchor region ends. `anchor_start` supplies the indentation.
fn insert_after(source: &str, anchor_start: usize, anchor_end: usize, import_path: &str) -> String {
    let newline = if source.contains("\r\n") { "\r\n" } else { "\n" };
    let line = format!(
        "{indent}use {import_path} as _;",
        indent = line_indent(source, anchor_start)
    );

    let head = source.get(..anchor_end).unwrap_or_default();
    let split = if head.ends_with('\n') {
        Some(anchor_end)
    } else {
        source
            .get(anchor_end..)
            .unwrap_or_default()
            .find('\n')
            .map(|offset| anchor_end.saturating_add(offset).saturating_add(1))
    };

    let mut output = String::with_capacity(source.len() + line.len() + newline.len());
    match split.and_then(|index| source.split_at_checked(index)) {
        Some((head, rest)) => {
            output.push_str(head);
            output.push_str(&line);
            output.push_str(newline);
            output.push_str(rest);
        }
        None => {
            output.push_str(source);
            output.push_str(newline);
            output.push_str(&line);
        }
    }
    output
}

fn line_indent(source: &str, offset: usize) -> &str {
    let prefix = source.get(..offset).unwrap_or_default();
    let line_start = prefix.rfind('\n').map_or(0, |index| index + 1);
    let leading = prefix.get(line_start..).unwrap_or_default();
    if leading.chars().all(char::is_whitespace) {
        leading
    } else {
        ""
    }
}
