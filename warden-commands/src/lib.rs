pub mod threads;
pub mod utility;

use warden_core::{Data, Error};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::help::META,
    utility::usage::META,
    threads::threadconfig::META,
    threads::monitor::META,
    threads::exempt::META,
    threads::threadpreview::META,
    threads::threadschedule::META,
    threads::threadscan::META,
    threads::threadstatus::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::ping::ping(),
        utility::help::help(),
        utility::usage::usage(),
        threads::threadconfig::threadconfig(),
        threads::monitor::monitor(),
        threads::exempt::exempt(),
        threads::threadpreview::threadpreview(),
        threads::threadschedule::threadschedule(),
        threads::threadscan::threadscan(),
        threads::threadstatus::threadstatus(),
    ]
}
