use crate::log::Level;
use crate::log::tag_list::TagList;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogEvent {
    pub time: SystemTime,
    pub level: Level,
    pub tags: TagList,
}
impl LogEvent {
    #[must_use]
    pub fn epoch_ms(&self) -> u128 {
        self.time
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    }
}

pub trait Logger: Send + Sync {
    fn add(&self, event: LogEvent);
}

pub struct StdoutLogger {}
impl Logger for StdoutLogger {
    fn add(&self, event: LogEvent) {
        let time_ms = event.epoch_ms();
        let level = event.level;
        let mut tags = event.tags;
        if let Some(msg_index) = tags.iter().position(|tag| tag.name == "msg") {
            let msg_tag = tags.0.remove(msg_index);
            let msg = msg_tag.value;
            if tags.is_empty() {
                println!("{time_ms} {level} {msg}");
            } else {
                println!("{time_ms} {level} {msg} {tags}");
            }
        } else {
            println!("{time_ms} {level} {tags}");
        }
    }
}

pub static STDOUT_LOGGER: StdoutLogger = StdoutLogger {};

static GLOBAL_LOGGER: once_cell::sync::OnceCell<Mutex<Box<dyn Logger>>> =
    once_cell::sync::OnceCell::new();

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GlobalLoggerAlreadySetError {}

/// Sets the logger that receives events from [`crate::log::error`],
/// [`crate::log::info`], and [`crate::log::debug`].
///
/// # Errors
/// Returns an error when a global logger was already set.
pub fn set_global_logger(
    logger: impl Logger + 'static,
) -> Result<(), GlobalLoggerAlreadySetError> {
    GLOBAL_LOGGER
        .set(Mutex::new(Box::new(logger)))
        .map_err(|_| GlobalLoggerAlreadySetError {})
}

pub fn log(time: SystemTime, level: Level, tags: impl Into<TagList>) {
    let event = LogEvent {
        time,
        level,
        tags: tags.into(),
    };
    if let Some(mutex_box_logger) = GLOBAL_LOGGER.get() {
        match mutex_box_logger.lock() {
            Ok(box_logger) => box_logger.add(event),
            Err(..) => {}
        }
    } else {
        STDOUT_LOGGER.add(event);
    }
}
