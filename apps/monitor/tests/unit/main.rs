mod test_alert_rules;
mod test_metrics;
mod test_scoring;
