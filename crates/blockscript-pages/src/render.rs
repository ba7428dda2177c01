//! Overlay rendering.
//!
//! Each character of the overlay content is rendered as its own `<span>`
//! tagged with its content index and a style class. Selected characters get
//! the high style, everything else the low style.

use std::borrow::Cow;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::selection::SelectedIndexSet;

/// Visual style of a rendered character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockscriptStyle {
	Low,
	High,
}

impl BlockscriptStyle {
	/// CSS class applied to the character's span.
	pub fn class_name(self) -> &'static str {
		match self {
			BlockscriptStyle::Low => "low-blockscript",
			BlockscriptStyle::High => "high-blockscript",
		}
	}

	pub fn for_selection(is_selected: bool) -> Self {
		if is_selected {
			BlockscriptStyle::High
		} else {
			BlockscriptStyle::Low
		}
	}
}

/// A character of the overlay content and its selection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Character {
	pub ch: char,
	/// UTF-16 offset of the character within the content
	pub index: usize,
	pub is_selected: bool,
}

impl Character {
	pub fn style(&self) -> BlockscriptStyle {
		BlockscriptStyle::for_selection(self.is_selected)
	}
}

/// Splits `content` into characters, marking those whose index is selected.
///
/// # Examples
///
/// ```
/// use blockscript_pages::render::characters;
/// use blockscript_pages::selection::SelectedIndexSet;
///
/// let chars = characters("AB", &SelectedIndexSet::from_range(0..1));
/// assert!(chars[0].is_selected);
/// assert!(!chars[1].is_selected);
/// ```
pub fn characters(content: &str, selected: &SelectedIndexSet) -> Vec<Character> {
	let mut index = 0;
	content
		.chars()
		.map(|ch| {
			let character = Character {
				ch,
				index,
				is_selected: selected.contains(index),
			};
			index += ch.len_utf16();
			character
		})
		.collect()
}

/// Inputs of the overlay component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayProps {
	/// Text rendered character by character
	pub content: String,
	/// URL drawn behind the characters
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub background_image: Option<String>,
	/// Transaction the content was inscribed in
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
}

impl OverlayProps {
	pub fn new(content: impl Into<String>) -> Self {
		Self {
			content: content.into(),
			..Self::default()
		}
	}

	pub fn with_background_image(mut self, url: impl Into<String>) -> Self {
		self.background_image = Some(url.into());
		self
	}

	pub fn with_tx_hash(mut self, tx_hash: impl Into<String>) -> Self {
		self.tx_hash = Some(tx_hash.into());
		self
	}
}

/// Renders the overlay markup for `props` with `selected` highlighted.
///
/// # Examples
///
/// ```
/// use blockscript_pages::render::{OverlayProps, render_overlay_html};
/// use blockscript_pages::selection::SelectedIndexSet;
///
/// let html = render_overlay_html(&OverlayProps::new("A"), &SelectedIndexSet::new());
/// assert_eq!(
///     html,
///     r#"<div class="blockscript-overlay"><span class="low-blockscript" data-index="0">A</span></div>"#
/// );
/// ```
pub fn render_overlay_html(props: &OverlayProps, selected: &SelectedIndexSet) -> String {
	let mut html = String::with_capacity(64 + props.content.len() * 48);

	html.push_str(r#"<div class="blockscript-overlay""#);
	if let Some(tx_hash) = &props.tx_hash {
		let _ = write!(html, r#" data-tx-hash="{}""#, html_escape(tx_hash));
	}
	if let Some(url) = &props.background_image {
		let style = format!("background-image: url(\"{}\")", css_string_escape(url));
		let _ = write!(html, r#" style="{}""#, html_escape(&style));
	}
	html.push('>');

	for character in characters(&props.content, selected) {
		let mut buf = [0u8; 4];
		let _ = write!(
			html,
			r#"<span class="{}" data-index="{}">{}</span>"#,
			character.style().class_name(),
			character.index,
			html_escape(character.ch.encode_utf8(&mut buf)),
		);
	}

	html.push_str("</div>");
	html
}

fn html_escape(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '<', '>', '"', '\'']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				'"' => escaped.push_str("&quot;"),
				'\'' => escaped.push_str("&#x27;"),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}

// Contents of a double-quoted CSS string.
fn css_string_escape(s: &str) -> Cow<'_, str> {
	if s.contains(['"', '\\', '\n', '\r']) {
		let mut escaped = String::with_capacity(s.len() + 4);
		for c in s.chars() {
			match c {
				'"' => escaped.push_str("\\\""),
				'\\' => escaped.push_str("\\\\"),
				'\n' => escaped.push_str("\\a "),
				'\r' => escaped.push_str("\\d "),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}
