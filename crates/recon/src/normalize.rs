//! Field normalization: raw date / description / amount text → comparable canonical forms.
//!
//! Every function here is total: malformed input yields `None` (or an empty string)
//! and never an error. The caller records the failure on the movement.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::FieldNormalizationFailure;
use crate::model::{NormalizedMovement, RawMovement};

const DATE_SEPARATORS: [char; 3] = ['/', '-', '.'];

/// Build the canonical form of one raw record.
pub fn normalize_movement(index: usize, raw: &RawMovement) -> NormalizedMovement {
    let date = normalize_date(&raw.date_text);
    let amount = normalize_amount(&raw.amount_text);

    let mut issues = Vec::new();
    if date.is_none() {
        issues.push(FieldNormalizationFailure::UnparseableDate(
            raw.date_text.trim().to_string(),
        ));
    }
    if amount.is_none() {
        issues.push(FieldNormalizationFailure::UnparseableAmount(
            raw.amount_text.trim().to_string(),
        ));
    }
    for issue in &issues {
        log::debug!("record {index}: {issue}");
    }

    NormalizedMovement {
        index,
        date,
        description: normalize_description(&raw.description_text),
        amount,
        issues,
    }
}

// ---------------------------------------------------------------------------
// Date
// ---------------------------------------------------------------------------

/// Parse a calendar date, day-first.
///
/// Accepted shapes (separator `/`, `-` or `.`, used consistently):
/// - `YYYY-MM-DD`
/// - `DD-MM-YYYY` / `DD-MM-YY`, falling back to `MM-DD-YYYY` only when the
///   day-first reading is not a valid date.
///
/// A trailing time component (`2024-01-05 00:00:00`, `2024-01-05T10:30`) is ignored.
pub fn normalize_date(text: &str) -> Option<NaiveDate> {
    let date_part = text
        .trim()
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()?;

    let sep = date_part.chars().find(|c| DATE_SEPARATORS.contains(c))?;
    let parts: Vec<&str> = date_part.split(sep).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    if parts[0].len() == 4 {
        let year: i32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let day: u32 = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if parts[0].len() > 2 || parts[1].len() > 2 {
        return None;
    }
    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year = expand_year(parts[2])?;

    NaiveDate::from_ymd_opt(year, second, first)
        .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

/// Four-digit years pass through; two-digit years pivot like `%y`
/// (00–68 → 20xx, 69–99 → 19xx).
fn expand_year(text: &str) -> Option<i32> {
    let value: i32 = text.parse().ok()?;
    match text.len() {
        4 => Some(value),
        2 if value <= 68 => Some(2000 + value),
        2 => Some(1900 + value),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

/// Uppercase, strip diacritics, blank out everything but `A-Z 0-9 - _ .`,
/// collapse whitespace. Idempotent.
pub fn normalize_description(text: &str) -> String {
    let cleaned: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_uppercase)
        .map(|c| {
            if c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// Parse a locale-formatted amount into a non-negative decimal rounded to 2 dp
/// (half away from zero).
///
/// Separator resolution, in order:
/// 1. The rightmost `,`/`.` followed by exactly two digits is the decimal separator.
/// 2. If both `,` and `.` occur, the rightmost one is the decimal separator.
/// 3. A separator that occurs more than once is a thousands separator.
/// 4. A single separator followed by exactly three digits, after a non-zero
///    leading group, is a thousands separator (`1.234` → 1234).
/// 5. Otherwise the single separator is the decimal separator.
///
/// Signs, parentheses, whitespace, currency symbols and currency codes are only
/// accepted before or after the number. Inside it, spaces and apostrophes are
/// accepted as thousands grouping (`1 234,56`, `1'234.50`); anything else
/// (letters, exponents, a second number) makes the text unparseable.
///
/// Values whose integer part cannot carry two fractional digits in a `Decimal`
/// (more than 26 integer digits) are unparseable.
pub fn normalize_amount(text: &str) -> Option<Decimal> {
    let is_core = |c: char| c.is_ascii_digit() || c == ',' || c == '.';
    let start = text.find(is_core)?;
    let end = text.rfind(is_core)? + 1;

    let (prefix, core, suffix) = (&text[..start], &text[start..end], &text[end..]);
    if !prefix.chars().chain(suffix.chars()).all(is_affix_char) {
        return None;
    }
    let kept = ungroup(core)?;
    if !kept.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    let decimal_pos = decimal_separator_position(&kept);

    let (int_src, frac_src) = match decimal_pos {
        Some(pos) => (&kept[..pos], &kept[pos + 1..]),
        None => (kept.as_str(), ""),
    };
    let mut int_digits: String = int_src.chars().filter(char::is_ascii_digit).collect();
    if int_digits.is_empty() {
        int_digits.push('0');
    }

    let literal = if frac_src.is_empty() {
        int_digits
    } else {
        format!("{int_digits}.{frac_src}")
    };

    let mut value = Decimal::from_str(&literal)
        .ok()?
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    value.rescale(2);
    // rescale leaves the scale untouched when the mantissa would overflow
    if value.scale() != 2 {
        return None;
    }
    Some(value)
}

/// Characters allowed around the number: signs, parentheses, whitespace,
/// currency symbols and alphabetic currency codes.
fn is_affix_char(c: char) -> bool {
    matches!(c, '-' | '+' | '(' | ')' | '$' | '€' | '£' | '¥')
        || c.is_whitespace()
        || c.is_alphabetic()
}

/// Drop space / apostrophe digit grouping from the numeric core.
///
/// Grouping is accepted only in thousands shape: a leading group of 1 to 3
/// digits, then groups of exactly 3 digits, the last of which may be followed
/// by the decimal part. Returns `None` for any other character or shape.
fn ungroup(core: &str) -> Option<String> {
    if !core
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '\'') || c.is_whitespace())
    {
        return None;
    }

    let groups: Vec<&str> = core
        .split(|c: char| c == '\'' || c.is_whitespace())
        .filter(|g| !g.is_empty())
        .collect();
    if groups.len() == 1 {
        return Some(groups[0].to_string());
    }

    let (first, rest) = groups.split_first()?;
    if first.is_empty() || first.len() > 3 || !first.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let last = rest.len() - 1;
    for (i, group) in rest.iter().enumerate() {
        let (head, tail) = group.split_at(group.len().min(3));
        let head_ok = head.len() == 3 && head.bytes().all(|b| b.is_ascii_digit());
        let tail_ok = tail.is_empty() || (i == last && tail.starts_with([',', '.']));
        if !head_ok || !tail_ok {
            return None;
        }
    }
    Some(groups.concat())
}

/// Byte offset of the decimal separator in a digits-and-separators string, if any.
fn decimal_separator_position(kept: &str) -> Option<usize> {
    let pos = kept.rfind([',', '.'])?;
    let sep = kept[pos..].chars().next()?;
    let other = if sep == ',' { '.' } else { ',' };
    let trailing = &kept[pos + 1..];

    if trailing.len() == 2 || kept.contains(other) {
        return Some(pos);
    }
    if kept.matches(sep).count() > 1 {
        return None;
    }

    let leading = &kept[..pos];
    let leading_is_zero = leading.bytes().all(|b| b == b'0');
    if trailing.len() == 3 && !leading_is_zero {
        return None;
    }
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, day)
    }

    fn dec(s: &str) -> Option<Decimal> {
        Some(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn date_day_first_with_each_separator() {
        assert_eq!(normalize_date("05/01/2024"), d(2024, 1, 5));
        assert_eq!(normalize_date("05-01-2024"), d(2024, 1, 5));
        assert_eq!(normalize_date("05.01.2024"), d(2024, 1, 5));
        assert_eq!(normalize_date("5/1/2024"), d(2024, 1, 5));
    }

    #[test]
    fn date_year_first() {
        assert_eq!(normalize_date("2024-01-05"), d(2024, 1, 5));
        assert_eq!(normalize_date("2024/01/05"), d(2024, 1, 5));
    }

    #[test]
    fn date_two_digit_year_pivot() {
        assert_eq!(normalize_date("05/01/24"), d(2024, 1, 5));
        assert_eq!(normalize_date("05/01/99"), d(1999, 1, 5));
    }

    #[test]
    fn date_month_first_only_as_fallback() {
        // 03/04 is ambiguous: day-first wins.
        assert_eq!(normalize_date("03/04/2024"), d(2024, 4, 3));
        // 12/25 cannot be day-first.
        assert_eq!(normalize_date("12/25/2024"), d(2024, 12, 25));
    }

    #[test]
    fn date_ignores_time_component() {
        assert_eq!(normalize_date("2024-01-05 00:00:00"), d(2024, 1, 5));
        assert_eq!(normalize_date("2024-01-05T13:45:00"), d(2024, 1, 5));
        assert_eq!(normalize_date(" 05/01/2024 10:00 "), d(2024, 1, 5));
    }

    #[test]
    fn date_unparseable_is_none() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("yesterday"), None);
        assert_eq!(normalize_date("31/31/2024"), None);
        assert_eq!(normalize_date("05/01-2024"), None);
        assert_eq!(normalize_date("2024-02-30"), None);
        assert_eq!(normalize_date("05/01/2024/1"), None);
    }

    #[test]
    fn description_canonical_form() {
        assert_eq!(normalize_description("  Pago   proveedor á "), "PAGO PROVEEDOR A");
        assert_eq!(normalize_description("Transferencia N° 123/456"), "TRANSFERENCIA N 123 456");
        assert_eq!(normalize_description("Débito automático - AySA"), "DEBITO AUTOMATICO - AYSA");
        assert_eq!(normalize_description("niño_ref.01"), "NINO_REF.01");
        assert_eq!(normalize_description("\t\n"), "");
    }

    #[test]
    fn description_idempotent_examples() {
        for s in ["Ñandú  S.A.", "straße", "café—bar", "ｆｕｌｌｗｉｄｔｈ"] {
            let once = normalize_description(s);
            assert_eq!(normalize_description(&once), once);
        }
    }

    #[test]
    fn amount_locale_separators() {
        assert_eq!(normalize_amount("1.234,56"), dec("1234.56"));
        assert_eq!(normalize_amount("1,234.56"), dec("1234.56"));
        assert_eq!(normalize_amount("1234,5"), dec("1234.50"));
        assert_eq!(normalize_amount("1.234"), dec("1234.00"));
        assert_eq!(normalize_amount("1.234.567"), dec("1234567.00"));
        assert_eq!(normalize_amount("1,234,567.8"), dec("1234567.80"));
        assert_eq!(normalize_amount("0.125"), dec("0.13"));
        assert_eq!(normalize_amount(",50"), dec("0.50"));
        assert_eq!(normalize_amount("500"), dec("500.00"));
    }

    #[test]
    fn amount_sign_discarded() {
        assert_eq!(normalize_amount("-1.234,56"), normalize_amount("1.234,56"));
        assert_eq!(normalize_amount("(200.00)"), dec("200.00"));
        assert_eq!(normalize_amount("200.00-"), dec("200.00"));
    }

    #[test]
    fn amount_rounds_half_up() {
        assert_eq!(normalize_amount("1,234.565"), dec("1234.57"));
        assert_eq!(normalize_amount("2.3450"), dec("2.35"));
        assert_eq!(normalize_amount("-2.3449"), dec("2.34"));
    }

    #[test]
    fn amount_ignores_currency_markers() {
        assert_eq!(normalize_amount("$ 1.234,56"), dec("1234.56"));
        assert_eq!(normalize_amount("ARS 1.234,56"), dec("1234.56"));
        assert_eq!(normalize_amount("€1 234,56"), dec("1234.56"));
    }

    #[test]
    fn amount_accepts_digit_grouping() {
        assert_eq!(normalize_amount("1 234 567,89"), dec("1234567.89"));
        assert_eq!(normalize_amount("1'234.50"), dec("1234.50"));
        assert_eq!(normalize_amount("- 500,00 ARS"), dec("500.00"));
    }

    #[test]
    fn amount_rejects_text_inside_number() {
        assert_eq!(normalize_amount("1e3"), None);
        assert_eq!(normalize_amount("1E+03"), None);
        assert_eq!(normalize_amount("12 USD 34"), None);
    }

    #[test]
    fn amount_rejects_second_number() {
        assert_eq!(normalize_amount("Cta 1234 500,00"), None);
        assert_eq!(normalize_amount("1 23,00"), None);
        assert_eq!(normalize_amount("12 3456"), None);
    }

    #[test]
    fn amount_too_large_for_two_decimals() {
        assert_eq!(normalize_amount("79228162514264337593543950335"), None);
        assert_eq!(
            normalize_amount("12345678901234567890123456"),
            dec("12345678901234567890123456.00")
        );
    }

    #[test]
    fn amount_unparseable_is_none() {
        assert_eq!(normalize_amount(""), None);
        assert_eq!(normalize_amount("n/a"), None);
        assert_eq!(normalize_amount("12/03/2024"), None);
        assert_eq!(normalize_amount("--"), None);
    }

    #[test]
    fn movement_records_issues() {
        let raw = RawMovement::new("not a date", "Compra", "");
        let m = normalize_movement(7, &raw);
        assert_eq!(m.index, 7);
        assert!(!m.is_matchable());
        assert_eq!(
            m.issues,
            vec![
                FieldNormalizationFailure::UnparseableDate("not a date".into()),
                FieldNormalizationFailure::UnparseableAmount(String::new()),
            ]
        );

        let ok = normalize_movement(0, &RawMovement::new("05/01/2024", "Compra X", "500,00"));
        assert!(ok.is_matchable());
        assert!(ok.issues.is_empty());
        assert_eq!(ok.description, "COMPRA X");
    }
}
