//! A recording stand-in for the engine.
//!
//! A [`FakeContext`] is passed to the reporter as if it were a
//! `sqlite3_context`. Every primitive in [`FAKE_VTABLE`] casts the handle back
//! and records what it was asked to do. Aggregate scratch blocks live in a
//! [`FakeGroups`] registry so that several invocations of the same group see
//! the same block.

#![allow(dead_code)]

use std::{
    cell::RefCell,
    ffi::{c_char, c_int, c_uchar, c_void},
    rc::Rc,
};

use hashbrown::HashMap;
use rustc_hash::FxBuildHasher;
use sqlctx::{Capabilities, Engine, ResultReporter, ResultVtable, ffi};

/// One primitive invocation as observed by the fake engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Null,
    Int(c_int),
    Int64(i64),
    Double(f64),
    Text(Received),
    Blob(Received),
    ZeroBlob { len: i64, wide: bool },
    Error(Vec<u8>),
    ErrorCode(c_int),
    ErrorNomem,
    ErrorTooBig,
    AggregateContext { bytes: i64, wide: bool },
}

/// What a text or blob primitive received.
#[derive(Clone, Debug, PartialEq)]
pub struct Received {
    pub ptr: usize,
    pub len: i64,
    pub copy: bool,
    pub wide: bool,
    pub bytes: Vec<u8>,
    pub encoding: Option<c_uchar>,
}

pub type GroupId = u64;

/// Larger scratch requests fail, as an engine allocation would.
pub const MAX_SCRATCH_BYTES: usize = 1 << 20;

/// Scratch blocks per aggregate group.
#[derive(Clone, Default)]
pub struct FakeGroups {
    blocks: Rc<RefCell<HashMap<GroupId, Box<[u8]>, FxBuildHasher>>>,
}

impl FakeGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the block of `group`, as the engine does after finalize.
    pub fn finalize(&self, group: GroupId) {
        self.blocks.borrow_mut().remove(&group);
    }

    fn block(&self, group: GroupId, bytes: usize) -> *mut c_void {
        let mut blocks = self.blocks.borrow_mut();
        if let Some(block) = blocks.get_mut(&group) {
            return block.as_mut_ptr().cast::<c_void>();
        }
        if bytes == 0 || bytes > MAX_SCRATCH_BYTES {
            return std::ptr::null_mut();
        }
        let block = blocks
            .entry(group)
            .or_insert_with(|| vec![0u8; bytes].into_boxed_slice());
        block.as_mut_ptr().cast::<c_void>()
    }
}

/// The per-invocation handle of the fake engine.
pub struct FakeContext {
    calls: RefCell<Vec<Call>>,
    group: GroupId,
    groups: FakeGroups,
}

impl FakeContext {
    pub fn new() -> Self {
        Self::in_group(FakeGroups::new(), 0)
    }

    /// An invocation belonging to aggregate group `group`.
    pub fn in_group(groups: FakeGroups, group: GroupId) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            group,
            groups,
        }
    }

    pub fn as_ptr(&self) -> *mut ffi::sqlite3_context {
        std::ptr::from_ref(self).cast_mut().cast::<ffi::sqlite3_context>()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Runs `f` with a reporter bound to this context.
    pub fn report<R>(&self, engine: Engine, f: impl FnOnce(&mut ResultReporter<'_>) -> R) -> R {
        // SAFETY: `self` outlives the call and every primitive of the fake
        // tables accepts it
        unsafe { ResultReporter::scope_with(self.as_ptr(), engine, f) }
            .expect("fake context is never null")
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

/// # Safety
///
/// `ctx` must come from [`FakeContext::as_ptr`] on a live context.
unsafe fn fake<'a>(ctx: *mut ffi::sqlite3_context) -> &'a FakeContext {
    // SAFETY: guaranteed by the caller
    unsafe { &*ctx.cast::<FakeContext>() }
}

fn copied(destructor: ffi::sqlite3_destructor_type) -> bool {
    destructor.is_some()
}

/// # Safety
///
/// `ptr` must be readable for `len` bytes.
unsafe fn read(ptr: *const c_void, len: usize) -> Vec<u8> {
    // SAFETY: guaranteed by the caller
    unsafe { std::slice::from_raw_parts(ptr.cast::<u8>(), len) }.to_vec()
}

unsafe extern "C" fn result_null(ctx: *mut ffi::sqlite3_context) {
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::Null);
}

unsafe extern "C" fn result_int(ctx: *mut ffi::sqlite3_context, value: c_int) {
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::Int(value));
}

unsafe extern "C" fn result_int64(ctx: *mut ffi::sqlite3_context, value: i64) {
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::Int64(value));
}

unsafe extern "C" fn result_double(ctx: *mut ffi::sqlite3_context, value: f64) {
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::Double(value));
}

unsafe extern "C" fn result_text(
    ctx: *mut ffi::sqlite3_context,
    ptr: *const c_char,
    len: c_int,
    destructor: ffi::sqlite3_destructor_type,
) {
    // SAFETY: the reporter passes a payload readable for `len` bytes
    let bytes = unsafe { read(ptr.cast::<c_void>(), len as usize) };
    let payload = Received {
        ptr: ptr as usize,
        len: i64::from(len),
        copy: copied(destructor),
        wide: false,
        bytes,
        encoding: None,
    };
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::Text(payload));
}

unsafe extern "C" fn result_text64(
    ctx: *mut ffi::sqlite3_context,
    ptr: *const c_char,
    len: u64,
    destructor: ffi::sqlite3_destructor_type,
    encoding: c_uchar,
) {
    // SAFETY: the reporter passes a payload readable for `len` bytes
    let bytes = unsafe { read(ptr.cast::<c_void>(), len as usize) };
    let payload = Received {
        ptr: ptr as usize,
        len: len as i64,
        copy: copied(destructor),
        wide: true,
        bytes,
        encoding: Some(encoding),
    };
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::Text(payload));
}

unsafe extern "C" fn result_blob(
    ctx: *mut ffi::sqlite3_context,
    ptr: *const c_void,
    len: c_int,
    destructor: ffi::sqlite3_destructor_type,
) {
    // SAFETY: the reporter passes a payload readable for `len` bytes
    let bytes = unsafe { read(ptr, len as usize) };
    let payload = Received {
        ptr: ptr as usize,
        len: i64::from(len),
        copy: copied(destructor),
        wide: false,
        bytes,
        encoding: None,
    };
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::Blob(payload));
}

unsafe extern "C" fn result_blob64(
    ctx: *mut ffi::sqlite3_context,
    ptr: *const c_void,
    len: u64,
    destructor: ffi::sqlite3_destructor_type,
) {
    // SAFETY: the reporter passes a payload readable for `len` bytes
    let bytes = unsafe { read(ptr, len as usize) };
    let payload = Received {
        ptr: ptr as usize,
        len: len as i64,
        copy: copied(destructor),
        wide: true,
        bytes,
        encoding: None,
    };
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::Blob(payload));
}

unsafe extern "C" fn result_zeroblob(ctx: *mut ffi::sqlite3_context, len: c_int) {
    let call = Call::ZeroBlob {
        len: i64::from(len),
        wide: false,
    };
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(call);
}

unsafe extern "C" fn result_zeroblob64(ctx: *mut ffi::sqlite3_context, len: u64) -> c_int {
    let call = Call::ZeroBlob {
        len: len as i64,
        wide: true,
    };
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(call);
    ffi::SQLITE_OK as c_int
}

unsafe extern "C" fn result_error(ctx: *mut ffi::sqlite3_context, msg: *const c_char, len: c_int) {
    // SAFETY: the reporter passes a message readable for `len` bytes
    let bytes = unsafe { read(msg.cast::<c_void>(), len as usize) };
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::Error(bytes));
}

unsafe extern "C" fn result_error_code(ctx: *mut ffi::sqlite3_context, code: c_int) {
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::ErrorCode(code));
}

unsafe extern "C" fn result_error_nomem(ctx: *mut ffi::sqlite3_context) {
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::ErrorNomem);
}

unsafe extern "C" fn result_error_toobig(ctx: *mut ffi::sqlite3_context) {
    // SAFETY: the reporter only passes fake contexts to this table
    unsafe { fake(ctx) }.record(Call::ErrorTooBig);
}

unsafe extern "C" fn aggregate_context(ctx: *mut ffi::sqlite3_context, bytes: c_int) -> *mut c_void {
    // SAFETY: the reporter only passes fake contexts to this table
    let fake = unsafe { fake(ctx) };
    fake.record(Call::AggregateContext {
        bytes: i64::from(bytes),
        wide: false,
    });
    fake.groups.block(fake.group, usize::try_from(bytes).unwrap_or(0))
}

unsafe extern "C" fn aggregate_context64(ctx: *mut ffi::sqlite3_context, bytes: u64) -> *mut c_void {
    // SAFETY: the reporter only passes fake contexts to this table
    let fake = unsafe { fake(ctx) };
    fake.record(Call::AggregateContext {
        bytes: bytes as i64,
        wide: true,
    });
    fake.groups.block(fake.group, bytes as usize)
}

const FAKE_TABLE: ResultVtable = ResultVtable {
    result_null,
    result_int,
    result_int64,
    result_double,
    result_text,
    result_text64: Some(result_text64),
    result_blob,
    result_blob64: Some(result_blob64),
    result_zeroblob,
    result_zeroblob64: Some(result_zeroblob64),
    result_error,
    result_error_code,
    result_error_nomem,
    result_error_toobig,
    aggregate_context,
    aggregate_context64: Some(aggregate_context64),
};

/// Every primitive, classic and wide.
pub static FAKE_VTABLE: ResultVtable = FAKE_TABLE;

/// The primitives of an engine that predates the 64-bit interfaces.
pub static CLASSIC_ONLY_VTABLE: ResultVtable = ResultVtable {
    result_text64: None,
    result_blob64: None,
    result_zeroblob64: None,
    aggregate_context64: None,
    ..FAKE_TABLE
};

pub fn wide_engine() -> Engine {
    Engine::new(&FAKE_VTABLE, Capabilities::wide()).expect("fake table has every primitive")
}

pub fn classic_engine() -> Engine {
    Engine::new(&FAKE_VTABLE, Capabilities::classic()).expect("classic needs nothing extra")
}

/// Runs `f` against a fresh context and returns what the engine observed.
pub fn observe(engine: Engine, f: impl FnOnce(&mut ResultReporter<'_>)) -> Vec<Call> {
    let ctx = FakeContext::new();
    ctx.report(engine, f);
    ctx.calls()
}
