/*
 * Responsibility
 * - resume の公開 ID (sqids) ↔ 内部 ID (bigint) の変換
 * - 方式を変えるときはここだけ触る (extractor / handler は IdCodec 経由)
 *
 * モジュール内で閉じたエラーなので thiserror は使わない
 */
use sqids::{Error as SqidsError, Sqids};
use std::{error::Error, fmt};

pub type Result<T> = std::result::Result<T, IdCodecError>;

#[derive(Debug)]
pub enum IdCodecError {
    InvalidMinLength { value: usize },
    Sqids(SqidsError),
    NegativeId { value: i64 },
    DecodeInvalidFormat,
    DecodeOutOfRange,
}

impl fmt::Display for IdCodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdCodecError::InvalidMinLength { value } => {
                write!(f, "SQIDS_MIN_LENGTH must be <= 255, got {}", value)
            }
            IdCodecError::Sqids(e) => write!(f, "sqids: {}", e),
            IdCodecError::NegativeId { value } => write!(f, "negative id: {}", value),
            IdCodecError::DecodeInvalidFormat => write!(f, "invalid public id"),
            IdCodecError::DecodeOutOfRange => write!(f, "public id out of range"),
        }
    }
}

impl Error for IdCodecError {}

impl From<SqidsError> for IdCodecError {
    fn from(e: SqidsError) -> Self {
        IdCodecError::Sqids(e)
    }
}

#[derive(Clone, Debug)]
pub struct IdCodec {
    sqids: Sqids,
}

impl IdCodec {
    pub fn new(min_length: usize, alphabet: &str) -> Result<Self> {
        let min_length: u8 = min_length
            .try_into()
            .map_err(|_| IdCodecError::InvalidMinLength { value: min_length })?;

        let sqids = Sqids::builder()
            .min_length(min_length)
            .alphabet(alphabet.chars().collect())
            .build()?;

        Ok(Self { sqids })
    }

    pub fn encode(&self, id: i64) -> Result<String> {
        let n = u64::try_from(id).map_err(|_| IdCodecError::NegativeId { value: id })?;
        Ok(self.sqids.encode(&[n])?)
    }

    /// 1 つの数値に戻り、かつ再 encode で同じ文字列になるものだけ受け付ける。
    /// sqids は同じ数値に複数の表現を持ち得るため、正規形以外は弾く。
    pub fn decode(&self, public_id: &str) -> Result<i64> {
        let nums = self.sqids.decode(public_id);
        let [n] = nums.as_slice() else {
            return Err(IdCodecError::DecodeInvalidFormat);
        };

        let canonical = self
            .sqids
            .encode(&[*n])
            .map_err(|_| IdCodecError::DecodeInvalidFormat)?;
        if canonical != public_id {
            return Err(IdCodecError::DecodeInvalidFormat);
        }

        i64::try_from(*n).map_err(|_| IdCodecError::DecodeOutOfRange)
    }
}
