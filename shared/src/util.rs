/// Today's date (UTC)
pub fn today_utc() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
