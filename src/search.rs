use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::enroll::template_failure;
use crate::error::{Error, Result};
use crate::led::{Indicator, Signal};
use crate::lockout::{LockoutState, LockoutVerdict};
use crate::responses::{GenImgStatus, Img2TzStatus, SearchStatus};
use crate::sensor::{CharBuffer, FingerprintSensor};

/// Best match the module found in its library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub finger_id: u16,
    pub confidence: u16,
}

/// Waits for a finger, templates it and searches the library.
///
/// A failed templating step counts towards `lockout`, and when that hits
/// its threshold the lockout is served here before returning. A match
/// clears the count. Returns the updated lockout state along with the match.
pub fn find_fingerprint<S, I, W>(
    sensor: &mut S,
    indicator: &mut I,
    out: &mut W,
    lockout: LockoutState,
) -> Result<(LockoutState, Option<Match>)>
where
    S: FingerprintSensor,
    I: Indicator,
    W: Write,
{
    writeln!(out, "Waiting for image...")?;
    out.flush()?;
    indicator.signal(Signal::Waiting);

    while sensor.capture_image().map_err(Error::sensor)? != GenImgStatus::Success {}

    write!(out, "Templating...")?;
    out.flush()?;
    let status = sensor.image_to_template(CharBuffer::One).map_err(Error::sensor)?;
    if status != Img2TzStatus::Success {
        debug!(?status, "templating failed");
        writeln!(out, "{}", template_failure(status))?;
        indicator.signal(Signal::Failure);

        let (lockout, verdict) = lockout.record_failure();
        if let LockoutVerdict::LockedOut { timeout } = verdict {
            serve_lockout(indicator, out, timeout)?;
        }
        return Ok((lockout, None));
    }
    writeln!(out, "Templated")?;

    write!(out, "Searching...")?;
    out.flush()?;
    let result = sensor.search().map_err(Error::sensor)?;
    match result.confirmation_code {
        SearchStatus::Success => writeln!(out, "Found fingerprint!")?,
        SearchStatus::NotFound => {
            writeln!(out, "No match found")?;
            indicator.signal(Signal::Failure);
            return Ok((lockout, None));
        }
        status => {
            debug!(?status, "search failed");
            writeln!(out, "Other error")?;
            indicator.signal(Signal::Failure);
            return Ok((lockout, None));
        }
    }

    indicator.signal(Signal::Success);
    let found = Match {
        finger_id: result.match_id,
        confidence: result.match_score,
    };
    info!(finger_id = found.finger_id, confidence = found.confidence, "fingerprint matched");
    Ok((lockout.record_success(), Some(found)))
}

fn serve_lockout<I, W>(indicator: &mut I, out: &mut W, timeout: Duration) -> Result<()>
where
    I: Indicator,
    W: Write,
{
    warn!(timeout_secs = timeout.as_secs(), "too many failed attempts, locking out");
    writeln!(out, "Too many failed attempts! Waiting for {} seconds.", timeout.as_secs())?;
    out.flush()?;
    indicator.signal(Signal::Lockout);
    indicator.pause(timeout);
    Ok(())
}
