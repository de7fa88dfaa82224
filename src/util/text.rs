use std::borrow::Cow;

use unicode_width::UnicodeWidthChar;

/// Ellipsis string used for truncation
const ELLIPSIS: &str = "...";
/// Display width of the ellipsis (3 columns for ASCII "...")
const ELLIPSIS_WIDTH: usize = 3;

/// Truncates a string to fit within a maximum display width.
///
/// If truncation is necessary, appends "..." to indicate text was cut off.
/// Uses Unicode-aware width calculation to handle CJK characters and emoji
/// correctly, ensuring the result fits within the specified column width.
///
/// Used for movie titles and directors in the card list, where a long name
/// must not push the score off the row. Widths of 3 columns or fewer get as
/// many characters as fit, with no ellipsis.
///
/// # Examples
///
/// ```
/// use cinedash::util::truncate_to_width;
///
/// // String fits within width
/// assert_eq!(truncate_to_width("Short", 10), "Short");
///
/// // String needs truncation
/// assert_eq!(truncate_to_width("Hello World", 8), "Hello...");
///
/// // CJK text (2 columns per character)
/// assert_eq!(truncate_to_width("七人の侍", 7), "七人...");
///
/// // Edge cases: very narrow widths
/// assert_eq!(truncate_to_width("Test", 0), "");
/// assert_eq!(truncate_to_width("Test", 1), "T");
/// assert_eq!(truncate_to_width("Test", 2), "Te");
/// assert_eq!(truncate_to_width("Test", 3), "Tes");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    // Edge case: zero width returns empty string (borrowed static)
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    // Edge case: width too narrow to fit char + ellipsis
    // Return as many characters as fit without ellipsis
    if max_width <= ELLIPSIS_WIDTH {
        let mut byte_end = 0;
        let mut current_width = 0;
        for (idx, c) in s.char_indices() {
            let char_width = UnicodeWidthChar::width(c).unwrap_or(0);
            if current_width + char_width > max_width {
                break;
            }
            current_width += char_width;
            byte_end = idx + c.len_utf8();
        }
        // Check if we're returning the whole string
        if byte_end == s.len() {
            return Cow::Borrowed(s);
        }
        return Cow::Owned(s[..byte_end].to_string());
    }
    let target_width = max_width.saturating_sub(ELLIPSIS_WIDTH);

    let mut current_width = 0;
    let mut cut_point = None; // Byte index where we'd cut if truncation needed
    let mut exceeded_max = false;

    for (idx, c) in s.char_indices() {
        let char_width = UnicodeWidthChar::width(c).unwrap_or(0);

        // Record potential cut point when we first exceed target_width
        // (leaving room for ellipsis)
        if cut_point.is_none() && current_width + char_width > target_width {
            cut_point = Some(idx);
        }

        // Check if string exceeds max_width (needs truncation)
        if current_width + char_width > max_width {
            exceeded_max = true;
            break;
        }

        current_width += char_width;
    }

    if exceeded_max {
        // Use cut_point if set, otherwise cut at current position
        let cut = cut_point.unwrap_or(s.len());
        Cow::Owned(format!("{}{}", &s[..cut], ELLIPSIS))
    } else {
        Cow::Borrowed(s) // No allocation needed - string fits!
    }
}

/// Strip terminal control characters and ANSI escape sequences from text.
///
/// Movie names, directors and genres are free text entered by catalog admins
/// and are printed straight into the terminal.
///
/// Strips:
/// - ASCII control chars: 0x00-0x08, 0x0B-0x0C, 0x0E-0x1F, 0x7F
/// - ANSI CSI sequences: `\x1b[` ... (terminal byte 0x40-0x7E)
/// - ANSI OSC sequences: `\x1b]` ... (until BEL 0x07 or ST `\x1b\\`)
/// - Bare ESC (0x1b) not followed by `[` or `]`
///
/// Preserves: tab (0x09), newline (0x0A), carriage return (0x0D).
///
/// Returns `Cow::Borrowed` when the input contains no control characters (common case).
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let len = bytes.len();

    // Fast path: scan for any byte that needs stripping
    let needs_strip = bytes
        .iter()
        .any(|&b| b == 0x1b || b == 0x7f || (b < 0x20 && b != 0x09 && b != 0x0a && b != 0x0d));

    if !needs_strip {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        let b = bytes[i];

        if b == 0x1b {
            // ESC byte - check what follows
            if i + 1 < len && bytes[i + 1] == b'[' {
                // CSI sequence: skip \x1b[ then parameter/intermediate bytes until final byte
                i += 2;
                while i < len {
                    let c = bytes[i];
                    i += 1;
                    if (0x40..=0x7e).contains(&c) {
                        break; // final byte consumed
                    }
                }
            } else if i + 1 < len && bytes[i + 1] == b']' {
                // OSC sequence: skip \x1b] then everything until BEL or ST (\x1b\\)
                i += 2;
                while i < len {
                    if bytes[i] == 0x07 {
                        i += 1; // consume BEL
                        break;
                    }
                    if bytes[i] == 0x1b && i + 1 < len && bytes[i + 1] == b'\\' {
                        i += 2; // consume ST
                        break;
                    }
                    i += 1;
                }
            } else {
                // Bare ESC - skip it
                i += 1;
            }
        } else if b == 0x7f || (b < 0x20 && b != 0x09 && b != 0x0a && b != 0x0d) {
            // Control character (not tab/newline/CR) - skip
            i += 1;
        } else {
            // Safe byte - find the run of safe bytes to batch-copy
            let start = i;
            i += 1;
            while i < len {
                let nb = bytes[i];
                if nb == 0x1b || nb == 0x7f || (nb < 0x20 && nb != 0x09 && nb != 0x0a && nb != 0x0d)
                {
                    break;
                }
                i += 1;
            }
            // SAFETY: we only break on ASCII control bytes, which cannot appear
            // mid-codepoint in valid UTF-8, so s[start..i] is valid UTF-8.
            out.push_str(&s[start..i]);
        }
    }

    Cow::Owned(out)
}
