//! Controls - the pressable and link elements attached to an interactive message.
//!
//! Only pressable controls get a server-side identity. Links are handled entirely
//! by the Discord client and never reach the registry.

/// Maximum number of controls Discord renders in a single action row.
pub const CONTROLS_PER_ROW: usize = 5;

/// Default number of action rows a message may carry.
pub const DEFAULT_MAX_ROWS: usize = 5;

/// Visual style of a pressable control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlStyle {
    /// Blurple
    #[default]
    Primary,
    /// Grey
    Secondary,
    /// Green
    Success,
    /// Red
    Danger,
}

/// A single UI element attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// A button that produces press events routed through the registry.
    Pressable {
        /// Button text
        label: String,
        /// Button colour
        style: ControlStyle,
        /// Optional unicode emoji shown before the label
        emoji: Option<String>,
    },
    /// A hyperlink button. Carries no control id.
    Link {
        /// Button text
        label: String,
        /// Target URL
        url: String,
    },
}

impl Control {
    /// Creates a primary-styled pressable control.
    pub fn pressable(label: impl Into<String>) -> Self {
        Self::Pressable {
            label: label.into(),
            style: ControlStyle::Primary,
            emoji: None,
        }
    }

    /// Creates a link control.
    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self::Link {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Replaces the style of a pressable control. Links are returned unchanged.
    #[must_use]
    pub fn with_style(self, new_style: ControlStyle) -> Self {
        match self {
            Self::Pressable { label, emoji, .. } => Self::Pressable {
                label,
                style: new_style,
                emoji,
            },
            link @ Self::Link { .. } => link,
        }
    }

    /// Attaches an emoji to a pressable control. Links are returned unchanged.
    #[must_use]
    pub fn with_emoji(self, new_emoji: impl Into<String>) -> Self {
        match self {
            Self::Pressable { label, style, .. } => Self::Pressable {
                label,
                style,
                emoji: Some(new_emoji.into()),
            },
            link @ Self::Link { .. } => link,
        }
    }

    /// Whether this control is a plain hyperlink.
    #[must_use]
    pub const fn is_link(&self) -> bool {
        matches!(self, Self::Link { .. })
    }

    /// Text shown on the control.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pressable { label, .. } | Self::Link { label, .. } => label,
        }
    }
}

/// Builds the control id for the control at `index` of message `message_id`.
#[must_use]
pub fn control_id(message_id: &str, index: usize) -> String {
    format!("{message_id}@{index}")
}

/// Splits a control id back into its message id and control index.
///
/// Returns `None` for ids that were not produced by [`control_id`], such as
/// custom ids belonging to other bots or stale formats.
#[must_use]
pub fn parse_control_id(control_id: &str) -> Option<(&str, usize)> {
    let (message_id, index) = control_id.rsplit_once('@')?;
    if message_id.is_empty() {
        return None;
    }
    index.parse().ok().map(|index| (message_id, index))
}

/// Splits controls into action rows of at most [`CONTROLS_PER_ROW`] entries.
pub fn layout_rows<T>(items: impl IntoIterator<Item = T>) -> Vec<Vec<T>> {
    let mut rows: Vec<Vec<T>> = Vec::new();
    for item in items {
        match rows.last_mut() {
            Some(row) if row.len() < CONTROLS_PER_ROW => row.push(item),
            _ => rows.push(vec![item]),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_id_round_trips_through_parse() {
        let id = control_id("abc", 3);
        assert_eq!(id, "abc@3");
        assert_eq!(parse_control_id(&id), Some(("abc", 3)));
    }

    #[test]
    fn test_parse_control_id_rejects_foreign_ids() {
        assert_eq!(parse_control_id("cancel"), None);
        assert_eq!(parse_control_id("@2"), None);
        assert_eq!(parse_control_id("abc@x"), None);
    }

    #[test]
    fn test_layout_rows_chunks_by_five() {
        let rows = layout_rows(0..12);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec![0, 1, 2, 3, 4]);
        assert_eq!(rows[2], vec![10, 11]);
        assert!(layout_rows(Vec::<u8>::new()).is_empty());
    }

    #[test]
    fn test_builders_leave_links_alone() {
        let link = Control::link("Docs", "https://example.com").with_style(ControlStyle::Danger);
        assert!(link.is_link());
        assert_eq!(link.label(), "Docs");

        let button = Control::pressable("Next")
            .with_style(ControlStyle::Secondary)
            .with_emoji("▶");
        assert_eq!(
            button,
            Control::Pressable {
                label: "Next".to_string(),
                style: ControlStyle::Secondary,
                emoji: Some("▶".to_string()),
            }
        );
    }
}
