mod aggregate;
mod config;
mod report;
mod run;
mod runner;

pub(crate) use run::run;
