const UNITS: [(u64, &str); 3] = [
    (1024 * 1024 * 1024, "GB"),
    (1024 * 1024, "MB"),
    (1024, "KB"),
];

/// Human-readable byte count: "1 byte", "512 bytes", "1.0 KB", "3.4 GB"
pub fn human_size(bytes: u64) -> String {
    for (cutoff, label) in UNITS {
        if bytes >= cutoff {
            return format!("{:.1} {}", bytes as f64 / cutoff as f64, label);
        }
    }

    if bytes == 1 {
        "1 byte".to_string()
    } else {
        format!("{} bytes", bytes)
    }
}
