use core::fmt;

/// Octet value meaning "unspecified" in any date or time field.
pub const UNSPECIFIED: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date {
    pub year_since_1900: u8,
    pub month: u8,
    pub day: u8,
    pub weekday: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub hundredths: u8,
}

fn write_field(f: &mut fmt::Formatter<'_>, value: u8) -> fmt::Result {
    if value == UNSPECIFIED {
        f.write_str("*")
    } else {
        write!(f, "{value:02}")
    }
}

/// ISO-like `2024-03-09`; unspecified fields print as `*`.
impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year_since_1900 == UNSPECIFIED {
            f.write_str("*")?;
        } else {
            write!(f, "{}", 1900 + u16::from(self.year_since_1900))?;
        }
        f.write_str("-")?;
        write_field(f, self.month)?;
        f.write_str("-")?;
        write_field(f, self.day)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_field(f, self.hour)?;
        f.write_str(":")?;
        write_field(f, self.minute)?;
        f.write_str(":")?;
        write_field(f, self.second)?;
        f.write_str(".")?;
        write_field(f, self.hundredths)
    }
}

#[cfg(test)]
mod tests {
    use super::{Date, Time, UNSPECIFIED};

    #[test]
    fn display_with_wildcards() {
        let date = Date {
            year_since_1900: 124,
            month: 3,
            day: UNSPECIFIED,
            weekday: UNSPECIFIED,
        };
        assert_eq!(date.to_string(), "2024-03-*");

        let time = Time {
            hour: 7,
            minute: 5,
            second: 0,
            hundredths: 42,
        };
        assert_eq!(time.to_string(), "07:05:00.42");
    }
}
