//! Calendar values exchanged with the modem's real-time clock
//!
//! The modem reports and accepts its clock as `yy/MM/dd,hh:mm:ss±zz`.
//! The time zone is ignored on read and written as `+00`.

use core::fmt::Write;

use heapless::String;

/// Length of `yy/MM/dd,hh:mm:ss+00`
pub const CLOCK_TEXT_LEN: usize = 20;

/// Formatted clock value
pub type ClockText = String<CLOCK_TEXT_LEN>;

/// Errors from reading a clock value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DateTimeError {
    /// No `/` separator found in the line
    MissingDate,
    /// A field was missing or not a number
    InvalidField,
    /// A field is outside its calendar range
    OutOfRange,
}

/// Date and time with a two-digit year
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    /// Years since 2000
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Parse the clock field out of a `+CCLK: "yy/MM/dd,hh:mm:ss+zz"` line
    ///
    /// The field is located by its first `/`, so any prefix is accepted.
    pub fn parse(line: &[u8]) -> Result<Self, DateTimeError> {
        let slash = line
            .iter()
            .position(|&b| b == b'/')
            .ok_or(DateTimeError::MissingDate)?;
        let start = slash.checked_sub(2).ok_or(DateTimeError::InvalidField)?;
        let field = |n: usize| two_digits(line, start + n * 3);

        let value = Self {
            year: field(0)?,
            month: field(1)?,
            day: field(2)?,
            hour: field(3)?,
            minute: field(4)?,
            second: field(5)?,
        };
        value.check_range()?;
        Ok(value)
    }

    /// Format as `yy/MM/dd,hh:mm:ss+00`
    ///
    /// Fails with [`DateTimeError::OutOfRange`] for any value [`Self::parse`]
    /// would reject. Zero month and day are accepted, as the module
    /// reports them before its clock is first set.
    pub fn format(&self) -> Result<ClockText, DateTimeError> {
        self.check_range()?;
        let mut text = ClockText::new();
        write!(
            text,
            "{:02}/{:02}/{:02},{:02}:{:02}:{:02}+00",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
        .map_err(|_| DateTimeError::OutOfRange)?;
        Ok(text)
    }

    fn check_range(&self) -> Result<(), DateTimeError> {
        let in_range = self.month <= 12
            && self.day <= 31
            && self.hour <= 23
            && self.minute <= 59
            && self.second <= 59;
        // Year is at most 99 whenever it came from two digits
        if in_range && self.year <= 99 {
            Ok(())
        } else {
            Err(DateTimeError::OutOfRange)
        }
    }
}

fn two_digits(line: &[u8], at: usize) -> Result<u8, DateTimeError> {
    match line.get(at..at + 2) {
        Some([tens, units]) if tens.is_ascii_digit() && units.is_ascii_digit() => {
            Ok((tens - b'0') * 10 + (units - b'0'))
        }
        _ => Err(DateTimeError::InvalidField),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cclk_line() {
        let dt = DateTime::parse(b"+CCLK: \"24/03/17,09:05:42+08\"").unwrap();
        assert_eq!(
            dt,
            DateTime {
                year: 24,
                month: 3,
                day: 17,
                hour: 9,
                minute: 5,
                second: 42,
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(DateTime::parse(b"+CCLK: ERROR"), Err(DateTimeError::MissingDate));
        assert_eq!(DateTime::parse(b"/03/17"), Err(DateTimeError::InvalidField));
        assert_eq!(
            DateTime::parse(b"+CCLK: \"24/03/17,09:0"),
            Err(DateTimeError::InvalidField)
        );
    }

    #[test]
    fn test_format() {
        let dt = DateTime {
            year: 5,
            month: 12,
            day: 1,
            hour: 23,
            minute: 59,
            second: 0,
        };
        assert_eq!(dt.format().unwrap().as_str(), "05/12/01,23:59:00+00");
        assert_eq!(dt.format().unwrap().len(), CLOCK_TEXT_LEN);
    }

    #[test]
    fn test_format_rejects_out_of_range() {
        let base = DateTime {
            year: 24,
            month: 1,
            day: 2,
            hour: 3,
            minute: 4,
            second: 5,
        };
        let bad = [
            DateTime { year: 124, ..base },
            DateTime { month: 13, ..base },
            DateTime { day: 32, ..base },
            DateTime { hour: 24, ..base },
            DateTime { minute: 60, ..base },
            DateTime { second: 60, ..base },
        ];
        for dt in bad {
            assert_eq!(dt.format(), Err(DateTimeError::OutOfRange), "{:?}", dt);
        }
        // Unset clock
        assert_eq!(
            DateTime::default().format().unwrap().as_str(),
            "00/00/00,00:00:00+00"
        );
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(
            DateTime::parse(b"+CCLK: \"24/13/17,09:05:42+08\""),
            Err(DateTimeError::OutOfRange)
        );
        assert_eq!(
            DateTime::parse(b"+CCLK: \"24/03/17,25:05:42+08\""),
            Err(DateTimeError::OutOfRange)
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn format_then_parse_is_identity(
                year in 0u8..=255,
                month in 0u8..=255,
                day in 0u8..=40,
                hour in 0u8..=30,
                minute in 0u8..=70,
                second in 0u8..=70,
            ) {
                let dt = DateTime { year, month, day, hour, minute, second };
                match dt.format() {
                    Ok(text) => prop_assert_eq!(DateTime::parse(text.as_bytes()), Ok(dt)),
                    Err(e) => prop_assert_eq!(e, DateTimeError::OutOfRange),
                }
            }
        }
    }
}
