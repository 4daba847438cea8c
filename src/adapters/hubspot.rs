//! Hubspot form-conversion exports.
//!
//! The most involved adapter: the downloaded report title has to be
//! recovered from a percent-encoded tracking URL, the stock-code prefix
//! moved to the front, and a fixed catalog of known report titles applied
//! to rows the URL recovery could not code. Title recovery is best-effort;
//! an unmatched title is retained as-is, not fatal. Name/email columns have
//! Japanese-form duplicates that backfill the English ones.
//!
//! There is no transaction key and no firm name in the export; firms are
//! recovered later from email domains, and deduplication is disabled.

use std::sync::OnceLock;

use chrono::NaiveDate;
use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::adapters::dates;
use crate::pipeline_error::PipelineError;
use crate::record::{is_blocked_email, CanonicalRecord, RawTable};

const PLATFORM: &str = "Hubspot";

/// Post date placeholder for a source that carries none; the real post date
/// is attached later from the title master.
const PLACEHOLDER_POST_DATE: (i32, u32, u32) = (2000, 12, 31);

/// Publisher display names (English and Japanese) replaced by their stock
/// code in recovered titles.
const PUBLISHER_CODES: [(&str, &str); 10] = [
    ("Publisher 1", "(0001)"),
    ("パブリシャー 1", "(0001)"),
    ("Publisher 2", "(0002)"),
    ("パブリシャー 2", "(0002)"),
    ("Publisher 3", "(0003)"),
    ("パブリシャー 3", "(0003)"),
    ("Publisher 4", "(0004)"),
    ("パブリシャー 4", "(0004)"),
    ("Publisher 5", "(0005)"),
    ("パブリシャー 5", "(0005)"),
];

/// Known free-text report titles and their coded canonical forms. Applied
/// longest key first so that e.g. "…2Q 決算アップデート" never loses to its
/// "…2Q 決算" prefix.
const REPORT_CATALOG: [(&str, &str); 24] = [
    ("Initiating coverage", "(0002) Initiating coverage"),
    ("Financial model", "(0001) Financial model"),
    (
        "Transforming for a major sector turnaround",
        "(0001) Initiating coverage",
    ),
    ("Group investments", "(0001) Group investments"),
    ("Q2 FY3/2023 results update", "(0001) Q2 FY3/2023 results update"),
    ("Q3 FY3/2023 results update", "(0001) Q3 FY3/2023 results update"),
    (
        "Q4 FY3/2023 results update/deep-dive update",
        "(0001) Q4 FY3/2023 results update/deep-dive update",
    ),
    ("Q1 FY3/2024 results update", "(0001) Q1 FY3/2024 results update"),
    ("Q2 FY3/2024 results update", "(0001) Q2 FY3/2024 results update"),
    ("Q3 FY3/2022 results update", "(0001) Q3 FY3/2022 results update"),
    (
        "Q4 FY3/2024 results update/deep-dive update",
        "(0001) Q4 FY3/2023 results update/deep-dive update",
    ),
    ("カバレッジ開始", "(0001) カバレッジ開始"),
    ("ニュースリリース(1)", "(0001) ニュースリリース（1）"),
    ("ニュースリリースアラート(2)", "(0001) ニュースリリース（2）"),
    ("ニュースリリースアラート", "(0001) ニュースリリース（1）"),
    ("業績予測モデル", "(0001) 業績予測モデル"),
    ("22年3月期4Q 決算", "(0001) 22年3月期4Q 決算"),
    ("23年3月期1Q 決算", "(0001) 23年3月期1Q 決算"),
    ("23年3月期2Q 決算アップデート", "(0001) 23年3月期2Q 決算"),
    ("23年3月期2Q 決算", "(0001) 23年3月期2Q 決算"),
    ("23年3月期3Q 決算", "(0001) 23年3月期3Q 決算"),
    ("24年3月期1Q 決算", "(0001) 24年3月期1Q 決算"),
    ("24年3月期2Q 決算", "(0001) 24年3月期2Q 決算"),
    ("24年3月期3Q 決算", "(0001) 24年3月期3Q 決算"),
];

pub fn adapt(table: &RawTable) -> Result<Vec<CanonicalRecord>, PipelineError> {
    let first_name = table.require_column("First name", PLATFORM)?;
    let last_name = table.require_column("Last name", PLATFORM)?;
    let family_name_jp = table.require_column("姓", PLATFORM)?;
    let given_name_jp = table.require_column("名", PLATFORM)?;
    let email = table.require_column("Email", PLATFORM)?;
    let email_jp = table.require_column("メールアドレス", PLATFORM)?;
    let report = table.require_column("Downloaded Report", PLATFORM)?;
    let read_date = table.require_column("Conversion Date", PLATFORM)?;
    let page = table.require_column("Conversion Page", PLATFORM)?;

    let post_date = NaiveDate::from_ymd_opt(
        PLACEHOLDER_POST_DATE.0,
        PLACEHOLDER_POST_DATE.1,
        PLACEHOLDER_POST_DATE.2,
    )
    .ok_or_else(|| PipelineError::MalformedRow {
        publisher: PLATFORM,
        msg: "invalid placeholder post date".to_string(),
    })?;

    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        // Japanese-form columns backfill the English ones.
        let first = fallback(table.cell(row, first_name), table.cell(row, family_name_jp));
        let last = fallback(table.cell(row, last_name), table.cell(row, given_name_jp));
        let address = fallback(table.cell(row, email), table.cell(row, email_jp));
        let raw_report = table.cell(row, report);
        let conversion_page = table.cell(row, page);
        let conversion_date = table.cell(row, read_date);

        if is_blocked_email(address) {
            continue;
        }
        // Rows with any required value missing are unusable.
        if [first, last, address, raw_report, conversion_date, conversion_page]
            .iter()
            .any(|v| is_missing(v))
        {
            continue;
        }
        if is_test_row(raw_report, conversion_page) {
            continue;
        }

        let mut title = recover_title(conversion_page);
        title = apply_publisher_codes(title);
        title = apply_report_catalog(title);
        title = cleanup_title(title);
        if is_unusable_title(&title) {
            continue;
        }

        // Keep only the first address of a ;-separated list.
        let address = address.split(';').next().unwrap_or(address);

        records.push(CanonicalRecord {
            read_date: dates::iso_date_prefix(conversion_date, PLATFORM, "Conversion Date")?,
            post_date,
            user_name: format!("{first} {last}"),
            email: address.to_string(),
            report_title: title,
            platform: PLATFORM.to_string(),
            ..CanonicalRecord::unresolved()
        });
    }

    Ok(records)
}

fn fallback<'a>(primary: &'a str, secondary: &'a str) -> &'a str {
    if is_missing(primary) {
        secondary
    } else {
        primary
    }
}

fn is_missing(value: &str) -> bool {
    value.is_empty() || value == "nan"
}

fn is_test_row(report: &str, conversion_page: &str) -> bool {
    report.contains("テスト") || report == "Q2" || conversion_page.contains("non-disclosed link")
}

/// Recover the report title from the tracking URL.
///
/// The URL looks like `…<stock code>?document=<percent-encoded title>`.
/// When the path segment before `?document=` ends in a 4-digit stock code,
/// the code is prefixed in parentheses; otherwise a code embedded in the
/// title itself is moved to the front. Unrecoverable pages pass through
/// decoded but otherwise untouched.
fn recover_title(url: &str) -> String {
    let decoded = percent_decode_str(url).decode_utf8_lossy();
    let normalized: String = decoded
        .replace('（', "(")
        .replace('）', ")")
        .replace('\u{3000}', "");

    let Some((prefix, raw_title)) = normalized.split_once("?document=") else {
        return normalized;
    };
    let title = raw_title.replace("%20", " ");

    let code: String = prefix
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if code.len() == 4 && code.chars().all(|c| c.is_ascii_digit()) {
        return format!("({code}) {title}");
    }

    move_stock_code(&title)
}

fn stock_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\((\d{4})\)").expect("hard-coded pattern"))
}

fn page_count_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(\d+ページ\)|\(\d+ pages\)").expect("hard-coded pattern"))
}

fn code_only_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\(\d+\)$").expect("hard-coded pattern"))
}

/// Move an embedded `(dddd)` stock code to the front of the title.
fn move_stock_code(title: &str) -> String {
    match stock_code_regex().find(title) {
        Some(m) => {
            let code = m.as_str();
            let rest = title.replacen(code, "", 1);
            format!("{code} {}", rest.trim())
        }
        None => title.to_string(),
    }
}

fn apply_publisher_codes(mut title: String) -> String {
    for (name, code) in PUBLISHER_CODES {
        if title.contains(name) && !title.starts_with('(') {
            title = title.replace(name, code);
        }
    }
    title
}

fn apply_report_catalog(mut title: String) -> String {
    if title.starts_with('(') {
        return title;
    }
    let mut catalog = REPORT_CATALOG;
    catalog.sort_by_key(|(key, _)| std::cmp::Reverse(key.chars().count()));
    for (key, value) in catalog {
        if title.contains(key) && !title.starts_with('(') {
            title = title.replace(key, value);
        }
    }
    title
}

/// Strip page-count fragments and collapse known summary-edition titles
/// onto their canonical forms.
fn cleanup_title(title: String) -> String {
    let title = page_count_regex().replace_all(&title, "").into_owned();

    let summary_editions: [(&str, &str); 3] = [
        ("(0005)(サマリー版)", "(0005) FY3/2022 results update"),
        ("(0005)(サマリー版2)", "(0005) FY3/2022 results update"),
        ("(0004)(サマリー版)", "(0004) Q1 FY3/2024 results update"),
    ];
    for (marker, replacement) in summary_editions {
        if title.contains(marker) {
            return replacement.to_string();
        }
    }
    title
}

/// Titles that are only a stock code, plus one known-bad recovered title.
fn is_unusable_title(title: &str) -> bool {
    let trimmed = title.trim();
    if trimmed == "(0004) アバントグループ(0004)" {
        return true;
    }
    code_only_regex().is_match(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SENTINEL;
    use chrono::NaiveDate;

    const COLUMNS: [&str; 9] = [
        "First name",
        "Last name",
        "姓",
        "名",
        "Email",
        "メールアドレス",
        "Downloaded Report",
        "Conversion Date",
        "Conversion Page",
    ];

    fn table(rows: Vec<Vec<&str>>) -> RawTable {
        RawTable::new(
            COLUMNS.into_iter().map(String::from).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        )
    }

    #[test]
    fn test_recover_title_from_stock_code_path() {
        let url = "https://research.example.com/report/1234?document=Q3%20Results%20Update";
        assert_eq!(recover_title(url), "(1234) Q3 Results Update");
    }

    #[test]
    fn test_recover_title_moves_embedded_code_to_front() {
        let url = "https://research.example.com/library?document=Annual%20outlook%20(5678)%202024";
        assert!(recover_title(url).starts_with("(5678) Annual outlook"));
    }

    #[test]
    fn test_recover_title_without_document_marker_passes_through() {
        let url = "https://research.example.com/contact";
        assert_eq!(recover_title(url), url);
    }

    #[test]
    fn test_catalog_prefers_longest_key() {
        let coded = apply_report_catalog("23年3月期2Q 決算アップデート".to_string());
        assert_eq!(coded, "(0001) 23年3月期2Q 決算");
    }

    #[test]
    fn test_publisher_name_replaced_by_code() {
        let coded = apply_publisher_codes("Publisher 1 Initiating coverage".to_string());
        assert_eq!(coded, "(0001) Initiating coverage");
    }

    #[test]
    fn test_adapt_full_row() {
        let t = table(vec![vec![
            "Aiko",
            "Tanaka",
            "",
            "",
            "aiko@fund.example.com;backup@fund.example.com",
            "",
            "Some report",
            "2024-03-07 02:15:00 PM",
            "https://research.example.com/report/1234?document=Q3%20Results",
        ]]);
        let records = adapt(&t).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.user_name, "Aiko Tanaka");
        assert_eq!(r.email, "aiko@fund.example.com");
        assert_eq!(r.report_title, "(1234) Q3 Results");
        assert_eq!(r.read_date, NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(r.post_date, NaiveDate::from_ymd_opt(2000, 12, 31).unwrap());
        assert_eq!(r.firm_name, SENTINEL);
    }

    #[test]
    fn test_japanese_columns_backfill_names_and_email() {
        let t = table(vec![vec![
            "nan",
            "nan",
            "田中",
            "愛子",
            "nan",
            "aiko@fund.example.com",
            "Some report",
            "2024-03-07 02:15:00 PM",
            "https://research.example.com/report/1234?document=Q3",
        ]]);
        let records = adapt(&t).unwrap();
        assert_eq!(records[0].user_name, "田中 愛子");
        assert_eq!(records[0].email, "aiko@fund.example.com");
    }

    #[test]
    fn test_blocked_and_test_rows_are_dropped() {
        let t = table(vec![
            vec![
                "A",
                "B",
                "",
                "",
                "someone@non-disclosedcompany.com",
                "",
                "Some report",
                "2024-03-07 02:15:00 PM",
                "https://x.example/1234?document=T",
            ],
            vec![
                "A",
                "B",
                "",
                "",
                "a@fund.example.com",
                "",
                "社内テスト資料",
                "2024-03-07 02:15:00 PM",
                "https://x.example/1234?document=T",
            ],
            vec![
                "A",
                "B",
                "",
                "",
                "a@fund.example.com",
                "",
                "Q2",
                "2024-03-07 02:15:00 PM",
                "https://x.example/1234?document=T",
            ],
        ]);
        assert!(adapt(&t).unwrap().is_empty());
    }

    #[test]
    fn test_rows_with_missing_values_are_dropped() {
        let t = table(vec![vec![
            "A",
            "",
            "",
            "",
            "a@fund.example.com",
            "",
            "Some report",
            "2024-03-07 02:15:00 PM",
            "https://x.example/1234?document=T",
        ]]);
        assert!(adapt(&t).unwrap().is_empty());
    }

    #[test]
    fn test_cleanup_strips_page_counts_and_collapses_summary_editions() {
        assert_eq!(
            cleanup_title("(1234) Q3 Results (12 pages)".to_string()),
            "(1234) Q3 Results "
        );
        assert_eq!(
            cleanup_title("(1234) 決算 (3ページ)".to_string()),
            "(1234) 決算 "
        );
        assert_eq!(
            cleanup_title("(0004)(サマリー版)".to_string()),
            "(0004) Q1 FY3/2024 results update"
        );
    }

    #[test]
    fn test_code_only_titles_are_dropped() {
        assert!(is_unusable_title("(0004)"));
        assert!(is_unusable_title(" (0004) "));
        assert!(!is_unusable_title("(0004) Q1 FY3/2024 results update"));
    }
}
