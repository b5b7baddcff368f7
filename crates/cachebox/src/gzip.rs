// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Gzip value transform.
//!
//! The hook compresses values on the way in and inflates them on the way
//! out. Reads tolerate uncompressed values in the same keyspace: bytes
//! without the gzip magic header pass through unchanged.

use std::io::{Read, Write};

use bytes::Bytes;
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use futures::future::BoxFuture;

use crate::hooks::StoreHook;
use cachebox_store::{Context, Error, Item};

/// RFC 1952 gzip member header magic.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Highest gzip compression level.
const MAX_LEVEL: u32 = 9;

/// Error cause for a compression level outside `0..=9`.
///
/// Surfaces at write time only; the read side treats unrecognized input as
/// uncompressed data instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCompressionLevel(pub u32);

impl std::fmt::Display for InvalidCompressionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid gzip compression level: {}", self.0)
    }
}

impl std::error::Error for InvalidCompressionLevel {}

/// Hook that gzips values before writes and inflates them after reads.
pub(crate) struct GzipHook {
    level: u32,
}

impl GzipHook {
    pub(crate) fn new(level: u32) -> Self {
        Self { level }
    }
}

fn compress(value: &[u8], level: u32) -> Result<Bytes, Error> {
    if level > MAX_LEVEL {
        return Err(Error::from_source(InvalidCompressionLevel(level)));
    }

    let mut encoder = GzEncoder::new(Vec::with_capacity(value.len() / 2), Compression::new(level));
    encoder.write_all(value).map_err(Error::from_source)?;
    let compressed = encoder.finish().map_err(Error::from_source)?;
    Ok(Bytes::from(compressed))
}

fn inflate(value: &Bytes) -> Result<Bytes, Error> {
    if !value.starts_with(&GZIP_MAGIC) {
        // Legacy uncompressed value in the same keyspace.
        return Ok(value.clone());
    }

    let mut decoder = GzDecoder::new(value.as_ref());
    let mut inflated = Vec::with_capacity(value.len() * 2);
    decoder.read_to_end(&mut inflated).map_err(Error::from_source)?;
    Ok(Bytes::from(inflated))
}

impl StoreHook for GzipHook {
    fn after_read<'a>(&'a self, _ctx: &'a Context, _key: &'a str, value: Option<Bytes>) -> BoxFuture<'a, Result<Option<Bytes>, Error>> {
        Box::pin(async move {
            match value {
                None => Ok(None),
                Some(b) => Ok(Some(inflate(&b)?)),
            }
        })
    }

    fn before_write<'a>(&'a self, _ctx: &'a Context, item: Item) -> BoxFuture<'a, Result<Item, Error>> {
        Box::pin(async move {
            // Empty values stay empty on the wire; the read side passes
            // them through for the same reason (no gzip magic).
            if item.value().is_empty() {
                return Ok(item);
            }
            let compressed = compress(item.value(), self.level)?;
            Ok(item.with_value(compressed))
        })
    }
}
