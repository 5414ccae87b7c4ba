mod helpers;
mod test_alerting;
mod test_collector;
mod test_health;
