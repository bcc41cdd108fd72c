
mod test_pipeline;
mod test_scenarios;
