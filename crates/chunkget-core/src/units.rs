//! Human-readable byte sizes (binary units).

const UNIT: u64 = 1024;
const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

/// `512 B`, `1.5 KiB`, `3.0 GiB`, ...
pub fn format_size(bytes: u64) -> String {
    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut div = UNIT;
    let mut exp = 0usize;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}iB", bytes as f64 / div as f64, PREFIXES[exp])
}

/// Bytes per second as MiB/s.
pub fn mib_per_sec(bytes_per_sec: f64) -> f64 {
    bytes_per_sec / (1024.0 * 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_one_kib() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn unit_boundaries() {
        assert_eq!(format_size(1024), "1.0 KiB");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(1024 * 1024), "1.0 MiB");
        assert_eq!(format_size(1 << 30), "1.0 GiB");
        assert_eq!(format_size(5 * (1 << 40)), "5.0 TiB");
    }

    #[test]
    fn largest_values() {
        assert_eq!(format_size(u64::MAX), "16.0 EiB");
    }

    #[test]
    fn mib_rate() {
        assert!((mib_per_sec(2.0 * 1024.0 * 1024.0) - 2.0).abs() < 1e-9);
    }
}
