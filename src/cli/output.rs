//! Table rendering for command output

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Table};

use crate::models::{ContentHash, Entry};
use crate::ops::IndexStats;

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    table
}

fn right(value: impl ToString) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

/// Index names with their entry counts
pub fn index_table(indexes: &[(String, u64)]) -> Table {
    let mut table = table(vec!["Index", "Entries"]);
    for (name, count) in indexes {
        table.add_row(vec![Cell::new(name), right(count)]);
    }
    table
}

/// One row per entry; paths and attachments are listed one per line
pub fn entry_table(entries: &[(ContentHash, Entry)]) -> Table {
    let mut table = table(vec!["Hash", "Size", "Type", "Timestamp", "Paths", "Attachments"]);
    for (hash, entry) in entries {
        let paths: Vec<&str> = entry.paths.iter().map(String::as_str).collect();
        let attachments: Vec<String> =
            entry.attachments.iter().map(|(ext, path)| format!("{ext} {path}")).collect();

        table.add_row(vec![
            Cell::new(hash),
            right(entry.size),
            Cell::new(&entry.content_type),
            Cell::new(entry.timestamp.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(paths.join("\n")),
            Cell::new(attachments.join("\n")),
        ]);
    }
    table
}

pub fn stats_table(index: &str, stats: &IndexStats) -> Table {
    let mut table = table(vec!["Index", index]);
    table.add_row(vec![Cell::new("Unique contents"), right(stats.hash_count)]);
    table.add_row(vec![Cell::new("Files"), right(stats.file_count)]);
    table.add_row(vec![Cell::new("Duplicated contents"), right(stats.duplicate_hashes)]);
    table.add_row(vec![Cell::new("Unique bytes"), right(format_bytes(stats.total_bytes))]);
    for (content_type, count) in &stats.content_types {
        table.add_row(vec![Cell::new(format!("  {content_type}")), right(count)]);
    }
    table
}

/// Format bytes into a human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::DateTime;

    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
    }

    #[test]
    fn test_entry_table_lists_every_path() {
        let ts = DateTime::from_timestamp(0, 0).unwrap();
        let mut entry = Entry::new(6, ts, "text/plain").with_path("/a/1.txt").with_path("/b/1.txt");
        entry.attachments.insert(".json".to_string(), "/a/1.txt.json".to_string());
        let hash = ContentHash::from_bytes([0xab; 32]);

        let rendered = entry_table(&[(hash, entry)]).to_string();
        assert!(rendered.contains("/a/1.txt"));
        assert!(rendered.contains("/b/1.txt"));
        assert!(rendered.contains(".json /a/1.txt.json"));
        assert!(rendered.contains("1970-01-01 00:00:00"));
    }

    #[test]
    fn test_stats_table() {
        let stats = IndexStats {
            hash_count: 2,
            file_count: 3,
            duplicate_hashes: 1,
            total_bytes: 2048,
            content_types: BTreeMap::from([("image/jpeg".to_string(), 2)]),
        };
        let rendered = stats_table("photos", &stats).to_string();
        assert!(rendered.contains("photos"));
        assert!(rendered.contains("2.00 KB"));
        assert!(rendered.contains("image/jpeg"));
    }
}
