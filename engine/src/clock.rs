use chrono::{DateTime, Duration, Local, TimeZone, Timelike, Utc};

/// Time source for the store.
pub trait Clock: Send {
    fn now(&self) -> DateTime<Utc>;

    /// The next midnight after `now`, in local time.
    fn next_midnight(&self) -> DateTime<Utc> {
        next_midnight_in(&Local, self.now())
    }

    /// Hour of day (0-23) in the same zone `next_midnight` uses.
    fn local_hour(&self) -> u32 {
        self.now().with_timezone(&Local).hour()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that never moves unless told to. Midnight is computed in UTC.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn at_timestamp(secs: i64) -> Self {
        Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn set(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn next_midnight(&self) -> DateTime<Utc> {
        next_midnight_in(&Utc, self.now)
    }

    fn local_hour(&self) -> u32 {
        self.now.hour()
    }
}

/// Start of the day after `now` in `tz`, falling back to `now + 24h` when that
/// local time does not exist.
pub fn next_midnight_in<Tz: TimeZone>(tz: &Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    let local = now.with_timezone(tz);
    local
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now + Duration::hours(24))
}
