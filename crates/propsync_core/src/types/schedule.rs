//! Recurring time windows.
//!
//! A schedule is active for `len` seconds starting at `frm` and then again
//! at every repetition allowed by `msk`, until `to` (0 means forever).
//!
//! Layout of `msk`:
//!
//! | Bits  | Meaning                                   |
//! |-------|-------------------------------------------|
//! | 31-30 | unit for fixed-delta schedules            |
//! | 29-26 | schedule type                             |
//! | 25-0  | repetition count for fixed-delta          |
//! | 15-8  | month (0-based) for yearly schedules      |
//! | 7-0   | weekday bitmask, or day of the month      |

use chrono::{DateTime, Datelike, Month, Weekday};

use crate::record::MapData;
use crate::value::{Attribute, CloudValue};

const UNIT_MASK: u32 = 0xC000_0000;
const UNIT_SHIFT: u32 = 30;
const TYPE_MASK: u32 = 0x3C00_0000;
const TYPE_SHIFT: u32 = 26;
const MONTH_MASK: u32 = 0x0000_FF00;
const MONTH_SHIFT: u32 = 8;
const REP_MASK: u32 = 0x03FF_FFFF;
const DAY_MASK: u32 = 0x0000_00FF;
const ONE_SHOT: u64 = 0xFFFF_FFFF;

const SECONDS_PER_DAY: u64 = 86_400;

/// Unit of a fixed-delta repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleUnit {
    /// 1 second.
    Seconds,
    /// 60 seconds.
    Minutes,
    /// 3600 seconds.
    Hours,
    /// 86400 seconds.
    Days,
}

impl ScheduleUnit {
    fn to_code(self) -> u32 {
        match self {
            ScheduleUnit::Seconds => 0,
            ScheduleUnit::Minutes => 1,
            ScheduleUnit::Hours => 2,
            ScheduleUnit::Days => 3,
        }
    }

    fn from_code(code: u32) -> Self {
        match code & 0x3 {
            0 => ScheduleUnit::Seconds,
            1 => ScheduleUnit::Minutes,
            2 => ScheduleUnit::Hours,
            _ => ScheduleUnit::Days,
        }
    }

    /// Length of one unit in seconds.
    pub fn seconds(self) -> u64 {
        match self {
            ScheduleUnit::Seconds => 1,
            ScheduleUnit::Minutes => 60,
            ScheduleUnit::Hours => 3_600,
            ScheduleUnit::Days => SECONDS_PER_DAY,
        }
    }
}

/// How a schedule repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleType {
    /// Never repeats.
    OneShot,
    /// Every N units.
    FixedDelta,
    /// On selected weekdays.
    Weekly,
    /// On one day of every month.
    Monthly,
    /// On one day of one month.
    Yearly,
}

impl ScheduleType {
    fn to_code(self) -> u32 {
        match self {
            ScheduleType::OneShot => 0,
            ScheduleType::FixedDelta => 1,
            ScheduleType::Weekly => 2,
            ScheduleType::Monthly => 3,
            ScheduleType::Yearly => 4,
        }
    }

    fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ScheduleType::OneShot),
            1 => Some(ScheduleType::FixedDelta),
            2 => Some(ScheduleType::Weekly),
            3 => Some(ScheduleType::Monthly),
            4 => Some(ScheduleType::Yearly),
            _ => None,
        }
    }
}

/// A recurring time window, all fields in Unix seconds except `msk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Schedule {
    /// Start of the schedule.
    pub frm: u32,
    /// End of the schedule, 0 for none.
    pub to: u32,
    /// Duration of each active window.
    pub len: u32,
    /// Repetition configuration.
    pub msk: u32,
}

impl Schedule {
    /// Creates a schedule.
    pub fn new(frm: u32, to: u32, len: u32, msk: u32) -> Self {
        Self { frm, to, len, msk }
    }

    /// Configuration for a schedule that runs once.
    pub fn one_shot_mask() -> u32 {
        0
    }

    /// Configuration repeating every `delta` units, clamped to 26 bits.
    pub fn fixed_delta_mask(unit: ScheduleUnit, delta: u32) -> u32 {
        (unit.to_code() << UNIT_SHIFT)
            | (ScheduleType::FixedDelta.to_code() << TYPE_SHIFT)
            | delta.min(REP_MASK)
    }

    /// Configuration repeating on each of `days`.
    pub fn weekly_mask(days: &[Weekday]) -> u32 {
        let week = days
            .iter()
            .fold(0u32, |acc, day| acc | (1 << day.num_days_from_sunday()));
        (ScheduleType::Weekly.to_code() << TYPE_SHIFT) | week
    }

    /// Configuration repeating on `day` of every month, clamped to 1..=31.
    pub fn monthly_mask(day: u32) -> u32 {
        (ScheduleType::Monthly.to_code() << TYPE_SHIFT) | day.clamp(1, 31)
    }

    /// Configuration repeating on `day` of `month` every year.
    pub fn yearly_mask(month: Month, day: u32) -> u32 {
        let month0 = month.number_from_month() - 1;
        (ScheduleType::Yearly.to_code() << TYPE_SHIFT)
            | (month0 << MONTH_SHIFT)
            | day.clamp(1, 31)
    }

    /// Repetition type encoded in `msk`, if valid.
    pub fn schedule_type(&self) -> Option<ScheduleType> {
        ScheduleType::from_code((self.msk & TYPE_MASK) >> TYPE_SHIFT)
    }

    /// Returns true if `now` (Unix seconds) falls inside an active window.
    ///
    /// A `now` of 0 means wall-clock time is not yet known.
    pub fn is_active(&self, now: u64) -> bool {
        if now == 0 {
            return false;
        }
        let frm = u64::from(self.frm);
        if now < frm || (self.to != 0 && now >= u64::from(self.to)) {
            return false;
        }
        if !self.matches_calendar(now) {
            return false;
        }
        let elapsed = now.max(frm) - now.min(frm);
        match self.delta() {
            0 => elapsed <= u64::from(self.len),
            delta => elapsed % delta <= u64::from(self.len),
        }
    }

    fn matches_calendar(&self, now: u64) -> bool {
        let Some(schedule_type) = self.schedule_type() else {
            return false;
        };
        let date = match i64::try_from(now)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            Some(date) => date,
            None => return false,
        };
        let day = self.msk & DAY_MASK;
        match schedule_type {
            ScheduleType::OneShot | ScheduleType::FixedDelta => true,
            ScheduleType::Weekly => (1 << date.weekday().num_days_from_sunday()) & day != 0,
            ScheduleType::Monthly => date.day() == day,
            ScheduleType::Yearly => {
                date.day() == day && date.month0() == (self.msk & MONTH_MASK) >> MONTH_SHIFT
            }
        }
    }

    fn delta(&self) -> u64 {
        match self.schedule_type() {
            Some(ScheduleType::FixedDelta) => {
                let unit = ScheduleUnit::from_code((self.msk & UNIT_MASK) >> UNIT_SHIFT);
                unit.seconds() * u64::from(self.msk & REP_MASK)
            }
            Some(ScheduleType::Weekly | ScheduleType::Monthly | ScheduleType::Yearly) => {
                SECONDS_PER_DAY
            }
            _ => ONE_SHOT,
        }
    }
}

into_value!(Schedule, Schedule);

impl CloudValue for Schedule {
    const KIND: &'static str = "schedule";
    const ATTRIBUTES: &'static [&'static str] = &["frm", "to", "len", "msk"];

    fn attribute(&self, slot: usize) -> Option<Attribute<'_>> {
        let v = match slot {
            0 => self.frm,
            1 => self.to,
            2 => self.len,
            3 => self.msk,
            _ => return None,
        };
        Some(Attribute::Unsigned(u64::from(v)))
    }

    fn set_attribute(&mut self, slot: usize, record: &MapData) {
        let Some(v) = record.as_u32() else { return };
        match slot {
            0 => self.frm = v,
            1 => self.to = v,
            2 => self.len = v,
            3 => self.msk = v,
            _ => {}
        }
    }

    fn differs_from(&self, other: &Self, _min_delta: f32) -> bool {
        self != other
    }

    value_accessors!(Schedule);
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2021-01-04 00:00:00 UTC, a Monday.
    const MONDAY: u32 = 1_609_718_400;
    const DAY: u32 = 86_400;

    #[test]
    fn mask_builders() {
        assert_eq!(Schedule::one_shot_mask(), 0);
        assert_eq!(
            Schedule::fixed_delta_mask(ScheduleUnit::Minutes, 5),
            0x4400_0005
        );
        assert_eq!(
            Schedule::fixed_delta_mask(ScheduleUnit::Seconds, u32::MAX),
            0x0400_0000 | REP_MASK
        );
        assert_eq!(
            Schedule::weekly_mask(&[Weekday::Sun, Weekday::Mon, Weekday::Sat]),
            0x0800_0043
        );
        assert_eq!(Schedule::monthly_mask(0), 0x0C00_0001);
        assert_eq!(Schedule::monthly_mask(40), 0x0C00_001F);
        assert_eq!(Schedule::yearly_mask(Month::March, 15), 0x1000_020F);
    }

    #[test]
    fn unknown_time_is_inactive() {
        let s = Schedule::new(0, 0, 10, Schedule::one_shot_mask());
        assert!(!s.is_active(0));
        assert!(s.is_active(5));
    }

    #[test]
    fn one_shot_window() {
        let s = Schedule::new(MONDAY, 0, 60, Schedule::one_shot_mask());
        assert!(!s.is_active(u64::from(MONDAY) - 1));
        assert!(s.is_active(u64::from(MONDAY)));
        assert!(s.is_active(u64::from(MONDAY + 60)));
        assert!(!s.is_active(u64::from(MONDAY + 61)));
    }

    #[test]
    fn end_bound_is_exclusive() {
        let msk = Schedule::fixed_delta_mask(ScheduleUnit::Seconds, 10);
        let s = Schedule::new(MONDAY, MONDAY + 100, 5, msk);
        assert!(s.is_active(u64::from(MONDAY + 90)));
        assert!(!s.is_active(u64::from(MONDAY + 100)));
    }

    #[test]
    fn fixed_delta_repeats() {
        let msk = Schedule::fixed_delta_mask(ScheduleUnit::Minutes, 2);
        let s = Schedule::new(MONDAY, 0, 30, msk);
        assert!(s.is_active(u64::from(MONDAY + 120 + 30)));
        assert!(!s.is_active(u64::from(MONDAY + 120 + 31)));
        assert!(s.is_active(u64::from(MONDAY + 240)));
    }

    #[test]
    fn zero_repetition_does_not_divide_by_zero() {
        let msk = Schedule::fixed_delta_mask(ScheduleUnit::Hours, 0);
        let s = Schedule::new(MONDAY, 0, 30, msk);
        assert!(s.is_active(u64::from(MONDAY + 30)));
        assert!(!s.is_active(u64::from(MONDAY + 31)));
    }

    #[test]
    fn weekly_only_on_selected_days() {
        let msk = Schedule::weekly_mask(&[Weekday::Tue]);
        let s = Schedule::new(MONDAY, 0, 3_600, msk);
        assert!(!s.is_active(u64::from(MONDAY + 600)));
        assert!(s.is_active(u64::from(MONDAY + DAY + 600)));
        assert!(!s.is_active(u64::from(MONDAY + DAY + 3_601)));
        assert!(!s.is_active(u64::from(MONDAY + 2 * DAY + 600)));
        assert!(s.is_active(u64::from(MONDAY + 8 * DAY)));
    }

    #[test]
    fn monthly_and_yearly() {
        let monthly = Schedule::new(MONDAY, 0, 60, Schedule::monthly_mask(5));
        // 2021-01-05
        assert!(monthly.is_active(u64::from(MONDAY + DAY + 10)));
        assert!(!monthly.is_active(u64::from(MONDAY + 2 * DAY + 10)));

        let yearly = Schedule::new(MONDAY, 0, 60, Schedule::yearly_mask(Month::January, 5));
        assert!(yearly.is_active(u64::from(MONDAY + DAY)));
        let february_fifth = MONDAY + 32 * DAY;
        assert!(!yearly.is_active(u64::from(february_fifth)));
    }

    #[test]
    fn attributes_are_unsigned() {
        let mut s = Schedule::new(1, 2, 3, 4);
        assert_eq!(s.attribute(3), Some(Attribute::Unsigned(4)));
        s.set_attribute(1, &MapData::named("s:to").with_value(99.0));
        assert_eq!(s.to, 99);
        assert_eq!(s.schedule_type(), Some(ScheduleType::OneShot));
    }
}
