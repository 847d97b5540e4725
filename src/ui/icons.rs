//! Shared UI icons.
//!
//! Each emoji has a plain-text fallback for terminals without Unicode.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK] ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[X] ");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "* ");

// Tutorial indicators
pub static BULB: Emoji<'_, '_> = Emoji("💡 ", "Hint: ");
pub static FILE_NEW: Emoji<'_, '_> = Emoji("📄 ", "+ ");
pub static WAIT: Emoji<'_, '_> = Emoji("⏳ ", "... ");
