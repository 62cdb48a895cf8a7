//! Scripted stand-ins for the sensor and the LED.

use std::collections::VecDeque;
use std::time::Duration;

use thiserror::Error;

use crate::led::{Indicator, Signal};
use crate::responses::{
    DeletCharStatus, GenImgStatus, Img2TzStatus, ReadIndexTableStatus, RegModelStatus, SearchResult, SearchStatus,
    StoreStatus, TemplateNumStatus,
};
use crate::sensor::{CharBuffer, FingerprintSensor, Slot, TemplateIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    CaptureImage,
    ImageToTemplate(CharBuffer),
    CreateModel,
    StoreModel(u16),
    DeleteModel(u16),
    Search,
    ReadTemplates,
    TemplateCount,
}

#[derive(Debug, Error)]
#[error("serial link went away")]
pub struct LinkDown;

/// Replays queued statuses and records every call. Running out of script
/// for a call is a test bug and panics.
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    pub captures: VecDeque<GenImgStatus>,
    pub templates: VecDeque<Img2TzStatus>,
    pub models: VecDeque<RegModelStatus>,
    pub stores: VecDeque<StoreStatus>,
    pub deletes: VecDeque<DeletCharStatus>,
    pub searches: VecDeque<SearchResult>,
    pub indices: VecDeque<TemplateIndex>,
    /// Every call fails with `LinkDown` once set.
    pub link_down: bool,
    pub calls: Vec<Call>,
}

impl ScriptedSensor {
    pub fn capture(mut self, statuses: &[GenImgStatus]) -> Self {
        self.captures.extend(statuses);
        self
    }

    pub fn template(mut self, statuses: &[Img2TzStatus]) -> Self {
        self.templates.extend(statuses);
        self
    }

    pub fn model(mut self, status: RegModelStatus) -> Self {
        self.models.push_back(status);
        self
    }

    pub fn store(mut self, status: StoreStatus) -> Self {
        self.stores.push_back(status);
        self
    }

    pub fn delete(mut self, status: DeletCharStatus) -> Self {
        self.deletes.push_back(status);
        self
    }

    pub fn search_hit(mut self, match_id: u16, match_score: u16) -> Self {
        self.searches.push_back(SearchResult {
            address: 0xFFFF_FFFF,
            confirmation_code: SearchStatus::Success,
            match_id,
            match_score,
        });
        self
    }

    pub fn search_miss(mut self) -> Self {
        self.searches.push_back(SearchResult {
            address: 0xFFFF_FFFF,
            confirmation_code: SearchStatus::NotFound,
            match_id: 0,
            match_score: 0,
        });
        self
    }

    pub fn index(mut self, templates: &[u16]) -> Self {
        self.indices.push_back(TemplateIndex {
            confirmation_code: ReadIndexTableStatus::Success,
            templates: templates.to_vec(),
        });
        self
    }

    pub fn index_failure(mut self) -> Self {
        self.indices.push_back(TemplateIndex {
            confirmation_code: ReadIndexTableStatus::PacketError,
            templates: Vec::new(),
        });
        self
    }

    pub fn called(&self, call: Call) -> bool {
        self.calls.contains(&call)
    }

    fn next<T>(&mut self, call: Call, queue: fn(&mut Self) -> &mut VecDeque<T>) -> Result<T, LinkDown> {
        self.calls.push(call);
        if self.link_down {
            return Err(LinkDown);
        }
        match queue(self).pop_front() {
            Some(value) => Ok(value),
            None => panic!("no scripted reply for {:?}", call),
        }
    }
}

impl FingerprintSensor for ScriptedSensor {
    type Error = LinkDown;

    fn capture_image(&mut self) -> Result<GenImgStatus, LinkDown> {
        self.next(Call::CaptureImage, |s| &mut s.captures)
    }

    fn image_to_template(&mut self, buffer: CharBuffer) -> Result<Img2TzStatus, LinkDown> {
        self.next(Call::ImageToTemplate(buffer), |s| &mut s.templates)
    }

    fn create_model(&mut self) -> Result<RegModelStatus, LinkDown> {
        self.next(Call::CreateModel, |s| &mut s.models)
    }

    fn store_model(&mut self, slot: Slot) -> Result<StoreStatus, LinkDown> {
        self.next(Call::StoreModel(slot.get()), |s| &mut s.stores)
    }

    fn delete_model(&mut self, slot: Slot) -> Result<DeletCharStatus, LinkDown> {
        self.next(Call::DeleteModel(slot.get()), |s| &mut s.deletes)
    }

    fn search(&mut self) -> Result<SearchResult, LinkDown> {
        self.next(Call::Search, |s| &mut s.searches)
    }

    fn read_templates(&mut self) -> Result<TemplateIndex, LinkDown> {
        self.next(Call::ReadTemplates, |s| &mut s.indices)
    }

    fn template_count(&mut self) -> Result<(TemplateNumStatus, u16), LinkDown> {
        self.calls.push(Call::TemplateCount);
        if self.link_down {
            return Err(LinkDown);
        }
        let count = self.indices.front().map_or(0, |index| index.templates.len() as u16);
        Ok((TemplateNumStatus::Success, count))
    }
}

#[derive(Debug, Default)]
pub struct RecordingIndicator {
    pub signals: Vec<Signal>,
    pub pauses: Vec<Duration>,
}

impl Indicator for RecordingIndicator {
    fn signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    fn pause(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

pub fn output(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// A slot for tests, bypassing input parsing.
pub fn slot(value: u16) -> Slot {
    Slot::parse(&value.to_string(), &(0..=u16::MAX)).unwrap()
}
