//! Cleaning of CSV content before upload.
//!
//! Zoho rejects characters outside the Basic Multilingual Plane, which is
//! where emoji live.

use std::borrow::Cow;

/// What to do with characters outside the Basic Multilingual Plane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EmojiHandling {
    /// Upload as is.
    Keep,
    /// Remove them.
    #[default]
    Strip,
    /// Replace each with the given text.
    Replace(String),
}

/// Options applied to upload content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleanOptions {
    pub emoji: EmojiHandling,
}

impl CleanOptions {
    pub fn new(emoji: EmojiHandling) -> Self {
        Self { emoji }
    }

    /// Clean `content`, borrowing it when nothing changes.
    pub fn apply<'a>(&self, content: &'a str) -> Cow<'a, str> {
        if matches!(self.emoji, EmojiHandling::Keep) || !content.chars().any(outside_bmp) {
            return Cow::Borrowed(content);
        }
        let mut cleaned = String::with_capacity(content.len());
        for c in content.chars() {
            if !outside_bmp(c) {
                cleaned.push(c);
            } else if let EmojiHandling::Replace(replacement) = &self.emoji {
                cleaned.push_str(replacement);
            }
        }
        Cow::Owned(cleaned)
    }
}

fn outside_bmp(c: char) -> bool {
    u32::from(c) > 0xFFFF
}
