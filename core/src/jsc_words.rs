//! Rank-ordered dictionary for the varicoded word coder.
//!
//! Index order is codeword order: lower ranks get shorter codewords, so
//! the list starts with the characters and words most common in on-air
//! traffic. Every printable ASCII character appears as a single-character
//! entry, which makes the coder total over the supported charset.
//! Entries never contain an interior space; the lone " " entry stands in
//! for runs of consecutive spaces.

pub(crate) static WORDS: &[&str] = &[
    // Rank 0-6 fit a single codeword nibble.
    "E", "T", "A", "O", "I", "N", " ",
    // Common words and prosigns.
    "THE", "AND", "DE", "CQ", "73", "TU", "FB",
    "S", "R", "H", "L", "D", "C", "U", "M", "W", "F", "G", "Y", "P", "B",
    "V", "K", "J", "X", "Q", "Z",
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9",
    "TNX", "THANKS", "RIG", "ANT", "NAME", "QTH", "GRID", "PWR", "TEMP",
    "INFO", "MSG", "QSL", "QRZ", "AGN", "HW", "CPY", "COPY", "BAND", "FREQ",
    "WATTS", "DIPOLE", "VERT", "VERTICAL", "YAGI", "LOOP", "WIRE", "ENDFED",
    "GOOD", "MORNING", "AFTERNOON", "EVENING", "NIGHT", "DAY", "TODAY",
    "HELLO", "HI", "HOW", "ARE", "YOU", "YOUR", "URS", "MY", "ME", "IS",
    "IT", "IN", "ON", "AT", "TO", "OF", "FOR", "FROM", "WITH", "THIS",
    "THAT", "HERE", "THERE", "WHAT", "WHEN", "WHERE", "WHO", "WHY", "WILL",
    "CAN", "NOT", "NO", "YES", "OK", "ALL", "BEST", "GREAT", "NICE", "VERY",
    "WX", "SUNNY", "CLOUDY", "RAIN", "SNOW", "WIND", "WINDY", "COLD", "HOT",
    "WARM", "COOL", "DEG", "DEGS",
    "UP", "DOWN", "OVER", "OUT", "BACK", "AGAIN", "LATER", "SOON", "NOW",
    "NEW", "OLD", "FIRST", "LAST", "NEXT", "ONE", "TWO", "THREE",
    "SIGNAL", "REPORT", "SNR", "RST", "DB", "STRONG", "WEAK", "NOISE",
    "QRM", "QRN", "QSB", "QRP", "QRO", "FADING", "SOLID",
    "STATION", "PORTABLE", "MOBILE", "BASE", "HOME", "FIELD", "PARK",
    "SOTA", "POTA", "IOTA", "ACTIVATION", "SUMMIT",
    "RADIO", "AUDIO", "POWER", "BATTERY", "SOLAR", "MODE", "DIGITAL",
    "TEST", "TESTING", "CHECK", "NET", "TRAFFIC", "RELAY", "VIA",
    "PSE", "PLS", "PLEASE", "SRI", "SORRY", "CUL", "CUAGN", "GL", "GE",
    "GM", "GA", "GN", "DX", "OM", "YL", "XYL", "ES", "HR", "UR", "RRR",
    "ROGER", "WILCO", "STANDBY", "QRT", "QSY", "CLEAR", "DONE", "SK",
    "HAVE", "HAS", "HAD", "BEEN", "WAS", "WERE", "BE", "DO", "DOES", "DID",
    "GET", "GOT", "GO", "GOING", "COME", "SEE", "LOOK", "KNOW", "THINK",
    "WORK", "WORKED", "WORKING", "CALL", "CALLED", "CALLING", "HEAR",
    "HEARD", "HEARING", "SEND", "SENT", "RECEIVE", "RECEIVED", "ABOUT",
    "ALSO", "JUST", "ONLY", "SOME", "MORE", "MOST", "MUCH", "MANY", "WELL",
    "STILL", "THEN", "THAN", "TIME", "YEAR", "YEARS", "WEEK", "TONIGHT",
    // Remaining printable ASCII, one entry per character.
    ".", ",", "?", "!", "-", "+", "/", "@", ":", ";", "\"", "'", "(", ")",
    "#", "$", "%", "&", "*", "<", "=", ">", "[", "\\", "]", "^", "_", "`",
    "{", "|", "}", "~",
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n",
    "o", "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_printable_ascii() {
        for b in 0x20u8..0x7F {
            let c = (b as char).to_string();
            assert!(
                WORDS.contains(&c.as_str()),
                "missing single-char entry {c:?}"
            );
        }
    }

    #[test]
    fn no_interior_spaces() {
        for w in WORDS {
            assert!(*w == " " || !w.contains(' '), "{w:?}");
        }
    }

    #[test]
    fn entries_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for w in WORDS {
            assert!(seen.insert(*w), "duplicate entry {w:?}");
        }
    }
}
