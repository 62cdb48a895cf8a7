use std::io::{BufRead, Write};
use std::ops::{ControlFlow, RangeInclusive};

use tracing::{debug, info};

use crate::enroll::enroll_finger;
use crate::error::{Error, Result};
use crate::led::{Indicator, Signal};
use crate::lockout::LockoutState;
use crate::responses::{DeletCharStatus, ReadIndexTableStatus};
use crate::search::find_fingerprint;
use crate::sensor::{FingerprintSensor, Slot};

const RULE: &str = "----------------";

/// The interactive menu loop: enroll, find and delete prints.
#[derive(Debug)]
pub struct Console<S, I, R, W> {
    sensor: S,
    indicator: I,
    input: R,
    output: W,
    lockout: LockoutState,
    slots: RangeInclusive<u16>,
}

impl<S, I, R, W> Console<S, I, R, W>
where
    S: FingerprintSensor,
    I: Indicator,
    R: BufRead,
    W: Write,
{
    pub fn new(
        sensor: S,
        indicator: I,
        input: R,
        output: W,
        lockout: LockoutState,
        slots: RangeInclusive<u16>,
    ) -> Self {
        Self {
            sensor,
            indicator,
            input,
            output,
            lockout,
            slots,
        }
    }

    /// Runs until the input is exhausted. Failing to read the template index is fatal.
    pub fn run(&mut self) -> Result<()> {
        while let ControlFlow::Continue(()) = self.step()? {}
        Ok(())
    }

    /// Shows the menu and handles one command.
    pub fn step(&mut self) -> Result<ControlFlow<()>> {
        writeln!(self.output, "{}", RULE)?;
        let index = self.sensor.read_templates().map_err(Error::sensor)?;
        if index.confirmation_code != ReadIndexTableStatus::Success {
            return Err(Error::TemplateIndex(index.confirmation_code));
        }
        writeln!(self.output, "Fingerprint templates: {:?}", index.templates)?;
        writeln!(self.output, "e) enroll print")?;
        writeln!(self.output, "f) find print")?;
        writeln!(self.output, "d) delete print")?;
        writeln!(self.output, "{}", RULE)?;
        write!(self.output, "> ")?;
        self.output.flush()?;

        let line = match self.read_line()? {
            Some(line) => line,
            None => return Ok(ControlFlow::Break(())),
        };
        match line.trim() {
            "e" => match self.read_slot()? {
                Some(slot) => self.enroll(slot)?,
                None => return Ok(ControlFlow::Break(())),
            },
            "f" => self.find()?,
            "d" => match self.read_slot()? {
                Some(slot) => self.delete(slot)?,
                None => return Ok(ControlFlow::Break(())),
            },
            other => debug!(command = other, "ignoring unknown command"),
        }
        Ok(ControlFlow::Continue(()))
    }

    pub fn lockout(&self) -> LockoutState {
        self.lockout
    }

    pub fn into_parts(self) -> (S, I, W) {
        (self.sensor, self.indicator, self.output)
    }

    fn enroll(&mut self, slot: Slot) -> Result<()> {
        enroll_finger(&mut self.sensor, &mut self.indicator, &mut self.output, slot)?;
        Ok(())
    }

    fn find(&mut self) -> Result<()> {
        let (lockout, found) = find_fingerprint(&mut self.sensor, &mut self.indicator, &mut self.output, self.lockout)?;
        self.lockout = lockout;
        match found {
            Some(found) => writeln!(
                self.output,
                "Detected #{} with confidence {}",
                found.finger_id, found.confidence
            )?,
            None => {
                writeln!(self.output, "Finger not found")?;
                self.indicator.signal(Signal::Failure);
            }
        }
        Ok(())
    }

    fn delete(&mut self, slot: Slot) -> Result<()> {
        match self.sensor.delete_model(slot).map_err(Error::sensor)? {
            DeletCharStatus::Success => {
                info!(slot = slot.get(), "template deleted");
                writeln!(self.output, "Deleted!")?;
                self.indicator.signal(Signal::Success);
            }
            status => {
                debug!(?status, slot = slot.get(), "delete failed");
                writeln!(self.output, "Failed to delete")?;
                self.indicator.signal(Signal::Failure);
            }
        }
        Ok(())
    }

    /// Prompts until a slot inside the configured bounds is entered.
    fn read_slot(&mut self) -> Result<Option<Slot>> {
        loop {
            write!(
                self.output,
                "Enter ID # from {}-{}: ",
                self.slots.start(),
                self.slots.end()
            )?;
            self.output.flush()?;
            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            if let Some(slot) = Slot::parse(&line, &self.slots) {
                return Ok(Some(slot));
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::{GenImgStatus, Img2TzStatus, RegModelStatus, StoreStatus};
    use crate::testing::{output, Call, RecordingIndicator, ScriptedSensor};
    use std::io::Cursor;
    use std::time::Duration;

    type TestConsole<'a> = Console<ScriptedSensor, RecordingIndicator, Cursor<&'a [u8]>, Vec<u8>>;

    fn console(sensor: ScriptedSensor, input: &[u8]) -> TestConsole<'_> {
        Console::new(
            sensor,
            RecordingIndicator::default(),
            Cursor::new(input),
            Vec::new(),
            LockoutState::new(4, Duration::from_secs(10)),
            1..=127,
        )
    }

    #[test]
    fn shows_menu_and_stops_at_end_of_input() {
        let mut console = console(ScriptedSensor::default().index(&[1, 4]), b"");
        console.run().unwrap();
        let (_, _, out) = console.into_parts();
        let out = output(&out);
        assert!(out.contains("Fingerprint templates: [1, 4]"));
        assert!(out.contains("e) enroll print\nf) find print\nd) delete print\n"));
        assert!(out.ends_with("> "));
    }

    #[test]
    fn template_index_failure_is_fatal() {
        let mut console = console(ScriptedSensor::default().index_failure(), b"f\n");
        match console.run() {
            Err(Error::TemplateIndex(ReadIndexTableStatus::PacketError)) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn delete_retries_until_slot_in_range() {
        let sensor = ScriptedSensor::default()
            .index(&[9])
            .index(&[])
            .delete(DeletCharStatus::Success);
        let mut console = console(sensor, b"d\n0\n200\nnine\n9\n");
        console.run().unwrap();
        let (sensor, indicator, out) = console.into_parts();
        let out = output(&out);

        assert_eq!(out.matches("Enter ID # from 1-127: ").count(), 4);
        assert!(out.contains("Deleted!"));
        assert!(sensor.called(Call::DeleteModel(9)));
        assert_eq!(indicator.signals, [Signal::Success]);
    }

    #[test]
    fn failed_delete() {
        let sensor = ScriptedSensor::default()
            .index(&[])
            .index(&[])
            .delete(DeletCharStatus::DeleteFailed);
        let mut console = console(sensor, b"d\n3\n");
        console.run().unwrap();
        let (_, indicator, out) = console.into_parts();
        assert!(output(&out).contains("Failed to delete"));
        assert_eq!(indicator.signals, [Signal::Failure]);
    }

    #[test]
    fn enroll_from_menu() {
        let sensor = ScriptedSensor::default()
            .index(&[])
            .index(&[7])
            .capture(&[GenImgStatus::Success, GenImgStatus::FingerNotDetected, GenImgStatus::Success])
            .template(&[Img2TzStatus::Success, Img2TzStatus::Success])
            .model(RegModelStatus::Success)
            .store(StoreStatus::Success);
        let mut console = console(sensor, b"e\n7\n");
        console.run().unwrap();
        let (sensor, _, out) = console.into_parts();
        assert!(sensor.called(Call::StoreModel(7)));
        assert!(output(&out).contains("Fingerprint templates: [7]"));
    }

    #[test]
    fn find_then_detect() {
        let sensor = ScriptedSensor::default()
            .index(&[2])
            .index(&[2])
            .capture(&[GenImgStatus::Success])
            .template(&[Img2TzStatus::Success])
            .search_hit(2, 88);
        let mut console = console(sensor, b"f\n");
        console.run().unwrap();
        let (_, _, out) = console.into_parts();
        assert!(output(&out).contains("Detected #2 with confidence 88"));
    }

    #[test]
    fn repeated_misses_lock_out_and_reset() {
        let mut sensor = ScriptedSensor::default();
        for _ in 0..5 {
            sensor = sensor
                .index(&[])
                .capture(&[GenImgStatus::Success])
                .template(&[Img2TzStatus::ImageTooMessy]);
        }
        let sensor = sensor.index(&[]);
        let mut console = console(sensor, b"f\nf\nf\nf\nf\n");
        console.run().unwrap();

        assert_eq!(console.lockout().failed_attempts(), 1);
        let (_, indicator, out) = console.into_parts();
        let out = output(&out);
        assert_eq!(out.matches("Too many failed attempts!").count(), 1);
        assert_eq!(out.matches("Finger not found").count(), 5);
        assert_eq!(indicator.pauses, [Duration::from_secs(10)]);
    }

    #[test]
    fn end_of_input_at_slot_prompt_stops() {
        let mut console = console(ScriptedSensor::default().index(&[]), b"e\n");
        console.run().unwrap();
        let (sensor, _, _) = console.into_parts();
        assert_eq!(sensor.calls, [Call::ReadTemplates]);
    }

    #[test]
    fn unknown_command_redraws_menu() {
        let sensor = ScriptedSensor::default().index(&[]).index(&[]);
        let mut console = console(sensor, b"x\n");
        console.run().unwrap();
        let (sensor, _, out) = console.into_parts();
        assert_eq!(output(&out).matches("e) enroll print").count(), 2);
        assert_eq!(sensor.calls, [Call::ReadTemplates, Call::ReadTemplates]);
    }
}
