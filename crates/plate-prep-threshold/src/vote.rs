use log::debug;
use plate_prep_core::{BinaryImage, ImageError, BLACK};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors returned by [`vote`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("cannot vote over an empty ensemble")]
    EmptyEnsemble,
    #[error(
        "ensemble member {index} is {got_width}x{got_height}, expected {width}x{height}"
    )]
    DimensionMismatch {
        index: usize,
        width: usize,
        height: usize,
        got_width: usize,
        got_height: usize,
    },
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Per-pixel majority vote over binary images of identical size.
///
/// A pixel is BLACK when strictly more than `k / 2` of the `k` members mark
/// it BLACK. An exact even split resolves to WHITE.
#[cfg_attr(feature = "tracing", instrument(level = "debug", skip(members), fields(k = members.len())))]
pub fn vote(members: &[BinaryImage]) -> Result<BinaryImage, VoteError> {
    let first = members.first().ok_or(VoteError::EmptyEnsemble)?;
    let (width, height) = first.dimensions();
    for (index, m) in members.iter().enumerate().skip(1) {
        let (got_width, got_height) = m.dimensions();
        if (got_width, got_height) != (width, height) {
            return Err(VoteError::DimensionMismatch {
                index,
                width,
                height,
                got_width,
                got_height,
            });
        }
    }

    let mut black_votes = vec![0u32; width * height];
    for m in members {
        for (votes, &v) in black_votes.iter_mut().zip(m.as_raw()) {
            if v == BLACK {
                *votes += 1;
            }
        }
    }

    let majority = (members.len() / 2) as u32;
    let voted = BinaryImage::from_index_fn(width, height, |i| black_votes[i] <= majority)?;
    debug!(
        "voted {} members: {} of {} pixels foreground",
        members.len(),
        voted.count_foreground(),
        width * height
    );
    Ok(voted)
}
