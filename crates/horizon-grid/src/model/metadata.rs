//! Render hints for group header and totals rows.

use serde::{Deserialize, Serialize};

use super::group::{GroupHeader, GroupTotals};

/// How many columns a special row spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSpan {
    /// The row spans every column.
    All,
    /// The row spans this many columns.
    Count(usize),
}

/// Which formatter the rendering layer should use for a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowFormatter {
    /// Regular cell formatters.
    #[default]
    Cells,
    /// A group title formatter.
    GroupTitle,
    /// A totals formatter per column.
    GroupTotals,
}

/// Render hints for one row. Plain item rows have none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMetadata {
    pub selectable: bool,
    pub focusable: bool,
    /// Space separated CSS classes.
    pub css_classes: String,
    pub column_span: Option<ColumnSpan>,
    pub formatter: RowFormatter,
}

/// Supplies render hints for group rows.
///
/// A data view needs one before it can group.
pub trait GroupMetadataProvider: Send + Sync {
    fn group_row_metadata(&self, group: &GroupHeader) -> RowMetadata;
    fn totals_row_metadata(&self, totals: &GroupTotals) -> RowMetadata;
}

/// Options for [`DefaultGroupMetadataProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupMetadataOptions {
    pub group_css_class: String,
    pub group_title_css_class: String,
    pub totals_css_class: String,
    pub toggle_expanded_css_class: String,
    pub toggle_collapsed_css_class: String,
    pub group_focusable: bool,
    pub totals_focusable: bool,
    pub enable_expand_collapse: bool,
}

impl Default for GroupMetadataOptions {
    fn default() -> Self {
        Self {
            group_css_class: "grid-group".to_string(),
            group_title_css_class: "grid-group-title".to_string(),
            totals_css_class: "grid-group-totals".to_string(),
            toggle_expanded_css_class: "expanded".to_string(),
            toggle_collapsed_css_class: "collapsed".to_string(),
            group_focusable: true,
            totals_focusable: false,
            enable_expand_collapse: true,
        }
    }
}

/// Headers span all columns and carry toggle classes; totals rows use
/// per-column totals formatters.
#[derive(Debug, Clone, Default)]
pub struct DefaultGroupMetadataProvider {
    options: GroupMetadataOptions,
}

impl DefaultGroupMetadataProvider {
    pub fn new(options: GroupMetadataOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GroupMetadataOptions {
        &self.options
    }
}

impl GroupMetadataProvider for DefaultGroupMetadataProvider {
    fn group_row_metadata(&self, group: &GroupHeader) -> RowMetadata {
        let mut css_classes = self.options.group_css_class.clone();
        if self.options.enable_expand_collapse {
            let toggle = if group.collapsed {
                &self.options.toggle_collapsed_css_class
            } else {
                &self.options.toggle_expanded_css_class
            };
            css_classes.push(' ');
            css_classes.push_str(toggle);
        }
        RowMetadata {
            selectable: false,
            focusable: self.options.group_focusable,
            css_classes,
            column_span: Some(ColumnSpan::All),
            formatter: RowFormatter::GroupTitle,
        }
    }

    fn totals_row_metadata(&self, _totals: &GroupTotals) -> RowMetadata {
        RowMetadata {
            selectable: false,
            focusable: self.options.totals_focusable,
            css_classes: self.options.totals_css_class.clone(),
            column_span: None,
            formatter: RowFormatter::GroupTotals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn header(collapsed: bool) -> GroupHeader {
        GroupHeader {
            value: Value::from("a"),
            title: "a".into(),
            count: 2,
            collapsed,
            start_row: 0,
            end_row: 2,
            totals: None,
        }
    }

    #[test]
    fn test_group_row_classes() {
        let provider = DefaultGroupMetadataProvider::default();
        let meta = provider.group_row_metadata(&header(true));
        assert_eq!(meta.css_classes, "grid-group collapsed");
        assert_eq!(meta.column_span, Some(ColumnSpan::All));
        assert!(meta.focusable);
        assert!(!meta.selectable);

        let meta = provider.group_row_metadata(&header(false));
        assert_eq!(meta.css_classes, "grid-group expanded");
    }

    #[test]
    fn test_toggle_disabled() {
        let provider = DefaultGroupMetadataProvider::new(GroupMetadataOptions {
            enable_expand_collapse: false,
            ..Default::default()
        });
        assert_eq!(provider.group_row_metadata(&header(true)).css_classes, "grid-group");
    }

    #[test]
    fn test_totals_row() {
        let provider = DefaultGroupMetadataProvider::default();
        let meta = provider.totals_row_metadata(&GroupTotals::new(Value::from("a")));
        assert_eq!(meta.formatter, RowFormatter::GroupTotals);
        assert!(!meta.focusable);
        assert_eq!(meta.css_classes, "grid-group-totals");
    }
}
