use serde::{Deserialize, Serialize};

use postcard::{
    from_bytes_cobs,
    ser_flavors::{Cobs, Slice},
    serialize_with_flavor,
};

pub const SERIALIZE_BUFFER_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    IgniterGoodFirstTime,
    IgniterGood,
    FuelGone,
    MainPercent(u8),
    MainDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub timestamp_ms: u32,
    pub event: LogEvent,
}

/// Append-only event sink. Appends are gated by the enabled flag; `commit`
/// pushes anything still buffered out to the backing store.
pub trait EventSink {
    fn log_event(&mut self, timestamp_ms: u32, event: LogEvent);
    fn commit(&mut self);
    fn set_logging_enabled(&mut self, enabled: bool);
    fn reset(&mut self);
}

pub struct FlashEventLog<'a, F, const PAGE_SIZE: usize> {
    buffer0: &'a mut [u8; PAGE_SIZE],
    buffer1: &'a mut [u8; PAGE_SIZE],
    active_buffer: usize,
    active_buffer_index: usize,
    logging_enabled: bool,
    bytes_logged: u32,
    page_out_callback: Option<F>,
}

impl<'a, F, const PAGE_SIZE: usize> EventSink for FlashEventLog<'a, F, PAGE_SIZE>
where
    F: Fn(&[u8]),
{
    fn log_event(&mut self, timestamp_ms: u32, event: LogEvent) {
        if !self.logging_enabled {
            return;
        }

        let record = EventRecord {
            timestamp_ms,
            event,
        };

        let mut data_buffer = [0u8; SERIALIZE_BUFFER_SIZE];
        let serialized_size = match Self::serialize_record(&record, &mut data_buffer) {
            Some(size) => size,
            None => return,
        };

        self.bytes_logged += (serialized_size + 1) as u32;

        self.put_byte(serialized_size as u8);
        for byte in &data_buffer[0..serialized_size] {
            self.put_byte(*byte);
        }
    }

    fn commit(&mut self) {
        if self.active_buffer_index == 0 {
            return;
        }

        if let Some(callback) = &self.page_out_callback {
            if self.active_buffer == 0 {
                callback(&self.buffer0[0..self.active_buffer_index]);
            } else {
                callback(&self.buffer1[0..self.active_buffer_index]);
            }
        }

        // The partial page is now owned by the backing store; a repeated
        // commit must not push it again.
        self.flip_buffer();
    }

    fn set_logging_enabled(&mut self, enabled: bool) {
        self.logging_enabled = enabled;
    }

    fn reset(&mut self) {
        self.active_buffer = 0;
        self.active_buffer_index = 0;
        self.bytes_logged = 0;
    }
}

impl<'a, F, const PAGE_SIZE: usize> FlashEventLog<'a, F, PAGE_SIZE>
where
    F: Fn(&[u8]),
{
    pub fn new(
        buffer0: &'a mut [u8; PAGE_SIZE],
        buffer1: &'a mut [u8; PAGE_SIZE],
        page_out_callback: Option<F>,
    ) -> Self {
        Self {
            buffer0,
            buffer1,
            active_buffer: 0,
            active_buffer_index: 0,
            logging_enabled: false,
            bytes_logged: 0,
            page_out_callback,
        }
    }

    pub fn get_bytes_logged(&self) -> u32 {
        self.bytes_logged
    }

    pub fn retrieve_record(&self, buffer: &mut dyn Iterator<Item = &u8>) -> Option<EventRecord> {
        let size = (*buffer.next()?) as usize;
        let mut working_buffer = [0u8; SERIALIZE_BUFFER_SIZE];

        for byte in working_buffer.iter_mut().take(size) {
            *byte = *buffer.next()?;
        }

        Self::deserialize_record(&mut working_buffer[0..size])
    }

    pub fn active_buffer(&mut self) -> &mut [u8] {
        if self.active_buffer == 0 {
            &mut self.buffer0[0..self.active_buffer_index]
        } else {
            &mut self.buffer1[0..self.active_buffer_index]
        }
    }

    fn put_byte(&mut self, b: u8) {
        if self.active_buffer == 0 {
            self.buffer0[self.active_buffer_index] = b;
        } else {
            self.buffer1[self.active_buffer_index] = b;
        };

        self.active_buffer_index += 1;

        if self.active_buffer_index >= PAGE_SIZE {
            self.flip_buffer();

            if let Some(callback) = &self.page_out_callback {
                if self.active_buffer == 0 {
                    callback(&self.buffer1[..]);
                } else {
                    callback(&self.buffer0[..]);
                }
            }
        }
    }

    fn flip_buffer(&mut self) {
        self.active_buffer_index = 0;
        self.active_buffer = (self.active_buffer + 1) % 2;
    }

    fn serialize_record(record: &EventRecord, buffer: &mut [u8]) -> Option<usize> {
        match Cobs::try_new(Slice::new(buffer)) {
            Ok(flavor) => {
                let serialized =
                    serialize_with_flavor::<EventRecord, Cobs<Slice>, &mut [u8]>(record, flavor);

                match serialized {
                    Ok(output_buffer) => Some(output_buffer.len()),
                    Err(_) => None,
                }
            }
            Err(_) => None,
        }
    }

    fn deserialize_record(buffer: &mut [u8]) -> Option<EventRecord> {
        from_bytes_cobs(buffer).ok()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use std::cell::RefCell;

    #[test]
    fn disabled_log_records_nothing() {
        const PAGE_SIZE: usize = 64;
        let mut buffer0 = [0_u8; PAGE_SIZE];
        let mut buffer1 = [0_u8; PAGE_SIZE];

        let page_out = |_page: &[u8]| {
            panic!("Nothing should be paged out");
        };

        let mut log = FlashEventLog::new(&mut buffer0, &mut buffer1, Some(page_out));

        log.log_event(10, LogEvent::FuelGone);
        assert_eq!(log.get_bytes_logged(), 0);

        log.set_logging_enabled(true);
        log.log_event(11, LogEvent::FuelGone);
        assert!(log.get_bytes_logged() > 0);

        log.set_logging_enabled(false);
        let logged = log.get_bytes_logged();
        log.log_event(12, LogEvent::MainDone);
        assert_eq!(log.get_bytes_logged(), logged);
    }

    #[test]
    fn commit_flushes_partial_page() {
        const PAGE_SIZE: usize = 256;
        let mut buffer0 = [0_u8; PAGE_SIZE];
        let mut buffer1 = [0_u8; PAGE_SIZE];

        let committed: RefCell<Vec<u8>> = RefCell::new(Vec::new());
        let page_out = |page: &[u8]| {
            committed.borrow_mut().extend_from_slice(page);
        };

        let events = [
            (25, LogEvent::IgniterGoodFirstTime),
            (3999, LogEvent::FuelGone),
            (4002, LogEvent::MainPercent(0)),
            (5999, LogEvent::MainDone),
        ];

        let mut log = FlashEventLog::new(&mut buffer0, &mut buffer1, Some(page_out));
        log.set_logging_enabled(true);

        for (timestamp_ms, event) in &events {
            log.log_event(*timestamp_ms, *event);
        }

        log.set_logging_enabled(false);
        log.commit();

        let committed_bytes = committed.borrow().clone();
        let mut committed_iter = committed_bytes.iter();
        for (timestamp_ms, event) in &events {
            let record = log.retrieve_record(&mut committed_iter).unwrap();
            assert_eq!(record.timestamp_ms, *timestamp_ms);
            assert_eq!(record.event, *event);
        }
        assert!(log.retrieve_record(&mut committed_iter).is_none());
    }

    #[test]
    fn full_page_flips_and_pages_out() {
        const PAGE_SIZE: usize = 32;
        let mut buffer0 = [0_u8; PAGE_SIZE];
        let mut buffer1 = [0_u8; PAGE_SIZE];

        let pages_out: RefCell<usize> = RefCell::new(0);
        let page_out = |page: &[u8]| {
            assert_eq!(page.len(), PAGE_SIZE);
            *pages_out.borrow_mut() += 1;
        };

        let mut log = FlashEventLog::new(&mut buffer0, &mut buffer1, Some(page_out));
        log.set_logging_enabled(true);

        for i in 0..32 {
            log.log_event(i, LogEvent::MainPercent(i as u8));
        }

        assert!(*pages_out.borrow() > 0);
    }
}
