use std::io::Write;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::led::{Indicator, Signal};
use crate::responses::{GenImgStatus, Img2TzStatus, RegModelStatus, StoreStatus};
use crate::sensor::{CharBuffer, FingerprintSensor, Slot};

const REMOVE_FINGER_PAUSE: Duration = Duration::from_secs(1);

/// Where an enrollment gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollStage {
    Capture(CharBuffer),
    Template(CharBuffer),
    CreateModel,
    Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollOutcome {
    Stored(Slot),
    Aborted(EnrollStage),
}

impl EnrollOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }
}

/// Message shown when turning an image into a template fails.
pub(crate) fn template_failure(status: Img2TzStatus) -> &'static str {
    match status {
        Img2TzStatus::ImageTooMessy => "Image too messy",
        Img2TzStatus::FeatureFail => "Could not identify features",
        Img2TzStatus::InvalidImage => "Image invalid",
        _ => "Other error",
    }
}

/// Takes two images of the same finger, builds a model from them and stores it at `slot`.
///
/// Any failed step ends the enrollment on the spot. Nothing reaches the
/// library unless both images were templated and the model was created.
pub fn enroll_finger<S, I, W>(sensor: &mut S, indicator: &mut I, out: &mut W, slot: Slot) -> Result<EnrollOutcome>
where
    S: FingerprintSensor,
    I: Indicator,
    W: Write,
{
    for buffer in [CharBuffer::One, CharBuffer::Two] {
        match buffer {
            CharBuffer::One => write!(out, "Place finger on sensor...")?,
            CharBuffer::Two => write!(out, "Place same finger again...")?,
        }
        out.flush()?;

        loop {
            match sensor.capture_image().map_err(Error::sensor)? {
                GenImgStatus::Success => {
                    indicator.signal(Signal::Success);
                    writeln!(out, "Image taken")?;
                    break;
                }
                GenImgStatus::FingerNotDetected => {
                    write!(out, ".")?;
                    out.flush()?;
                }
                GenImgStatus::ImageNotCaptured => {
                    indicator.signal(Signal::Failure);
                    writeln!(out, "Imaging error")?;
                    return Ok(EnrollOutcome::Aborted(EnrollStage::Capture(buffer)));
                }
                status => {
                    debug!(?status, "image capture failed");
                    indicator.signal(Signal::Failure);
                    writeln!(out, "Other error")?;
                    return Ok(EnrollOutcome::Aborted(EnrollStage::Capture(buffer)));
                }
            }
        }

        write!(out, "Templating...")?;
        out.flush()?;
        match sensor.image_to_template(buffer).map_err(Error::sensor)? {
            Img2TzStatus::Success => {
                indicator.signal(Signal::Success);
                writeln!(out, "Templated")?;
            }
            status => {
                debug!(?status, ?buffer, "templating failed");
                writeln!(out, "{}", template_failure(status))?;
                return Ok(EnrollOutcome::Aborted(EnrollStage::Template(buffer)));
            }
        }

        if buffer == CharBuffer::One {
            writeln!(out, "Remove finger")?;
            indicator.pause(REMOVE_FINGER_PAUSE);
            while sensor.capture_image().map_err(Error::sensor)? != GenImgStatus::FingerNotDetected {}
        }
    }

    write!(out, "Creating model...")?;
    out.flush()?;
    match sensor.create_model().map_err(Error::sensor)? {
        RegModelStatus::Success => writeln!(out, "Created")?,
        RegModelStatus::EnrollMismatch => {
            writeln!(out, "Prints did not match")?;
            return Ok(EnrollOutcome::Aborted(EnrollStage::CreateModel));
        }
        status => {
            debug!(?status, "model creation failed");
            writeln!(out, "Other error")?;
            return Ok(EnrollOutcome::Aborted(EnrollStage::CreateModel));
        }
    }

    write!(out, "Storing model #{}...", slot)?;
    out.flush()?;
    match sensor.store_model(slot).map_err(Error::sensor)? {
        StoreStatus::Success => writeln!(out, "Stored")?,
        StoreStatus::BadLocation => {
            writeln!(out, "Bad storage location")?;
            return Ok(EnrollOutcome::Aborted(EnrollStage::Store));
        }
        StoreStatus::FlashError => {
            writeln!(out, "Flash storage error")?;
            return Ok(EnrollOutcome::Aborted(EnrollStage::Store));
        }
        status => {
            debug!(?status, "store failed");
            writeln!(out, "Other error")?;
            return Ok(EnrollOutcome::Aborted(EnrollStage::Store));
        }
    }

    info!(slot = slot.get(), "fingerprint enrolled");
    Ok(EnrollOutcome::Stored(slot))
}
