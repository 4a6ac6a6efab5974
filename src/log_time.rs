use std::time::{SystemTime, UNIX_EPOCH};

/// Byte length of a rendered timestamp; the envelope math relies on it.
pub const LOG_TIME_LEN: usize = 27;

/// A pre-rendered RFC3339 UTC timestamp with microseconds, e.g.
/// `2022-02-01T13:01:02.123456Z`.
///
/// Always exactly [`LOG_TIME_LEN`] ASCII bytes and built without heap
/// allocation, so the record emitter can splice it into the envelope as a raw
/// byte run. Uses a minimal civil-time conversion instead of importing a
/// calendar crate.
#[derive(Clone, Copy, Debug)]
pub struct LogTime([u8; LOG_TIME_LEN]);

impl LogTime {
    /// Captures and renders the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Renders `t`. Times before the UNIX epoch render as the epoch.
    #[must_use]
    pub fn from_system_time(t: SystemTime) -> Self {
        let d = t.duration_since(UNIX_EPOCH).unwrap_or_default();
        Self::from_unix(d.as_secs(), d.subsec_micros())
    }

    /// Renders a raw UNIX second count plus sub-second microseconds.
    #[must_use]
    pub fn from_unix(secs: u64, micros: u32) -> Self {
        let (year, mon, day, hour, min, sec) = civil_from_unix(secs);

        let mut b = *b"0000-00-00T00:00:00.000000Z";
        write_padded(&mut b[0..4], u64::from(year));
        write_padded(&mut b[5..7], u64::from(mon));
        write_padded(&mut b[8..10], u64::from(day));
        write_padded(&mut b[11..13], u64::from(hour));
        write_padded(&mut b[14..16], u64::from(min));
        write_padded(&mut b[17..19], u64::from(sec));
        write_padded(&mut b[20..26], u64::from(micros % 1_000_000));
        Self(b)
    }

    /// The rendered timestamp as raw bytes, ready for a raw buffer write.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; LOG_TIME_LEN] {
        &self.0
    }

    /// The rendered timestamp as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // The buffer only ever holds ASCII digits and punctuation.
        std::str::from_utf8(&self.0).unwrap_or("")
    }
}

/// Writes `v` zero-padded and right-aligned into `out`.
fn write_padded(out: &mut [u8], mut v: u64) {
    for slot in out.iter_mut().rev() {
        *slot = b'0' + (v % 10) as u8;
        v /= 10;
    }
}

/// Minimal UTC conversion (civil time) to avoid importing `chrono`.
///
/// Era-based conversion of days-since-epoch to the Gregorian calendar.
/// Years past 9999 clamp to 9999-12-31 so the rendered width stays fixed.
#[allow(clippy::many_single_char_names)]
fn civil_from_unix(mut s: u64) -> (u16, u8, u8, u8, u8, u8) {
    let sec = (s % 60) as u8;
    s /= 60;
    let min = (s % 60) as u8;
    s /= 60;
    let hour = (s % 24) as u8;
    s /= 24;

    let z: i64 = s as i64 + 719_468;

    let era = z / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = mp + if mp < 10 { 3 } else { -9 }; // [1, 12]
    let year = y + i64::from(m <= 2);

    if year > 9999 {
        return (9999, 12, 31, 23, 59, 59);
    }

    (year as u16, m as u8, d as u8, hour, min, sec)
}
