use crate::admin::AdminModule;
use crate::types::{DataKey, Error};
use core::fmt::{self, Write};
use soroban_sdk::{Address, Env, String};

pub const TEXT_CAPACITY: usize = 128;

pub fn verify_admin(env: &Env) -> Result<Address, Error> {
    let admin: Address = env
        .storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(Error::NotInitialized)?;
    admin.require_auth();
    Ok(admin)
}

pub fn ensure_contract_active(env: &Env) -> Result<(), Error> {
    if AdminModule::is_contract_paused(env) {
        return Err(Error::ContractPaused);
    }
    Ok(())
}

/// Fixed-capacity text sink for building descriptions without an allocator.
/// Output past the capacity is dropped.
pub struct TextBuf {
    buf: [u8; TEXT_CAPACITY],
    len: usize,
    truncated: bool,
}

impl TextBuf {
    pub fn new() -> Self {
        Self {
            buf: [0; TEXT_CAPACITY],
            len: 0,
            truncated: false,
        }
    }

    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

impl Write for TextBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        let mut take = s.len().min(TEXT_CAPACITY - self.len);
        while !s.is_char_boundary(take) {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        // nothing after a cut is kept
        self.truncated = take < s.len();
        Ok(())
    }
}

/// Renders `args` into a contract string of at most 128 bytes. Longer
/// output is cut at the last whole character that fits.
pub fn format_text(env: &Env, args: fmt::Arguments<'_>) -> String {
    let mut text = TextBuf::new();
    // TextBuf::write_str never fails; an Err can only come from a Display impl
    text.write_fmt(args).unwrap_or_default();
    String::from_str(env, text.as_str())
}
