//! Work-unit sequences: API pages, calendar days and calendar months.
//!
//! An [`Enumerator`] only moves past its current unit when told how that
//! unit ended ([`Progress`]), so a unit can never be dropped unnoticed.

use std::fmt;

use chrono::{Datelike, NaiveDate};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(YearMonth { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn succ(self) -> Self {
        if self.month == 12 {
            YearMonth {
                year: self.year + 1,
                month: 1,
            }
        } else {
            YearMonth {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One fetch granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WorkUnit {
    /// 1-based page number.
    Page(u32),
    Day(NaiveDate),
    Month(YearMonth),
}

impl fmt::Display for WorkUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkUnit::Page(n) => write!(f, "page {n}"),
            WorkUnit::Day(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            WorkUnit::Month(m) => write!(f, "{m}"),
        }
    }
}

/// How the current unit ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Fetched successfully with this many raw records.
    Fetched(usize),
    /// Given up on after retries ran out.
    Skipped,
}

#[derive(Clone, Debug)]
enum Mode {
    Pages {
        page_size: usize,
        max_skips: u32,
        consecutive_skips: u32,
    },
    Days {
        start: NaiveDate,
        end: NaiveDate,
    },
    Months {
        start: YearMonth,
        end: YearMonth,
    },
    Single(WorkUnit),
}

#[derive(Clone, Debug)]
pub struct Enumerator {
    mode: Mode,
    current: Option<WorkUnit>,
}

impl Enumerator {
    /// Pages from 1 until a page comes back short, or `max_skips` pages in
    /// a row had to be skipped.
    pub fn pages(page_size: u32, max_skips: u32) -> Self {
        Enumerator {
            mode: Mode::Pages {
                page_size: page_size as usize,
                max_skips: max_skips.max(1),
                consecutive_skips: 0,
            },
            current: Some(WorkUnit::Page(1)),
        }
    }

    /// Every day from `start` to `today`, both included.
    pub fn days(start: NaiveDate, today: NaiveDate) -> Self {
        Enumerator {
            mode: Mode::Days { start, end: today },
            current: (start <= today).then_some(WorkUnit::Day(start)),
        }
    }

    /// Every month from the one containing `start` to the one containing
    /// `today`, both included.
    pub fn months(start: NaiveDate, today: NaiveDate) -> Self {
        let (start, end) = (YearMonth::of(start), YearMonth::of(today));
        Enumerator {
            mode: Mode::Months { start, end },
            current: (start <= end).then_some(WorkUnit::Month(start)),
        }
    }

    pub fn single(unit: WorkUnit) -> Self {
        Enumerator {
            mode: Mode::Single(unit),
            current: Some(unit),
        }
    }

    /// The unit to work on, or `None` once the sequence is exhausted.
    pub fn current(&self) -> Option<WorkUnit> {
        self.current
    }

    pub fn advance(&mut self, progress: Progress) {
        let Some(unit) = self.current else {
            return;
        };
        self.current = match (&mut self.mode, unit) {
            (
                Mode::Pages {
                    page_size,
                    max_skips,
                    consecutive_skips,
                },
                WorkUnit::Page(n),
            ) => match progress {
                Progress::Fetched(count) => {
                    *consecutive_skips = 0;
                    (count >= *page_size).then_some(WorkUnit::Page(n + 1))
                }
                Progress::Skipped => {
                    *consecutive_skips += 1;
                    (*consecutive_skips < *max_skips).then_some(WorkUnit::Page(n + 1))
                }
            },
            (Mode::Days { end, .. }, WorkUnit::Day(d)) => d
                .succ_opt()
                .filter(|next| *next <= *end)
                .map(WorkUnit::Day),
            (Mode::Months { end, .. }, WorkUnit::Month(m)) => {
                Some(m.succ()).filter(|next| *next <= *end).map(WorkUnit::Month)
            }
            _ => None,
        };
    }

    /// Starts the sequence over from its first unit.
    pub fn restart(&mut self) {
        *self = match self.mode.clone() {
            Mode::Pages {
                page_size,
                max_skips,
                ..
            } => Enumerator::pages(page_size as u32, max_skips),
            Mode::Days { start, end } => Enumerator::days(start, end),
            Mode::Months { start, end } => Enumerator {
                mode: Mode::Months { start, end },
                current: (start <= end).then_some(WorkUnit::Month(start)),
            },
            Mode::Single(unit) => Enumerator::single(unit),
        };
    }
}
