use core::fmt;
use core::marker::PhantomData;
use core::mem;
use core::ops::{Deref, DerefMut};
use core::ptr::NonNull;
use std::alloc::{self, Layout};

use crate::error::SharedError;
use crate::shared::Shared;

// Box, but without special treatment from miri and allowed to be empty. Control blocks keep their value in
// a Unique so that co-owners may hold raw pointers into it while it is alive.

/// An exclusive owner of a heap value. Moving it transfers ownership, dropping it destroys the value.
pub struct Unique<T : ?Sized> {
    data : Option<NonNull<T>>,
    _ph : PhantomData<T>
}

unsafe impl <T : ?Sized + Send> Send for Unique<T> {}
unsafe impl <T : ?Sized + Sync> Sync for Unique<T> {}

// Moves `value` into a fresh allocation compatible with Box::from_raw, reporting failure instead of aborting.
pub(crate) fn try_allocate<T>(value : T) -> Result<NonNull<T>, SharedError>
{
    let layout = Layout::new::<T>();
    if layout.size() == 0 {
        let ptr = NonNull::<T>::dangling();
        unsafe {
            ptr.as_ptr().write(value);
        }
        return Ok(ptr);
    }

    let raw = unsafe { alloc::alloc(layout) } as *mut T;
    match NonNull::new(raw) {
        Some(ptr) => {
            unsafe {
                ptr.as_ptr().write(value);
            }
            Ok(ptr)
        }
        None => Err(SharedError::Alloc { size : layout.size(), align : layout.align() }),
    }
}

impl <T> Unique<T> {
    #[inline(always)]
    pub fn new(x : T) -> Unique<T>
    {
        Unique::from_box(Box::new(x))
    }

    /// Like `new`, but returns `SharedError::Alloc` when the allocator fails.
    pub fn try_new(x : T) -> Result<Unique<T>, SharedError>
    {
        let data = try_allocate(x)?;
        Ok(Unique::from_non_null(data))
    }
}

impl <T : ?Sized> Unique<T> {
    pub const fn empty() -> Unique<T>
    {
        Unique { data : None, _ph : PhantomData }
    }

    pub fn from_box(x : Box<T>) -> Unique<T>
    {
        let data = unsafe { NonNull::new_unchecked(Box::into_raw(x)) };
        Unique::from_non_null(data)
    }

    /// Takes ownership of `ptr`. A null pointer gives an empty owner.
    /// # Safety
    /// A non-null `ptr` must come from `Box::into_raw` or `Unique::into_raw` and must not be owned elsewhere.
    pub unsafe fn from_raw(ptr : *mut T) -> Unique<T>
    {
        Unique { data : NonNull::new(ptr), _ph : PhantomData }
    }

    pub(crate) fn from_non_null(data : NonNull<T>) -> Unique<T>
    {
        Unique { data : Some(data), _ph : PhantomData }
    }

    /// Gives up ownership without destroying the value. The owner is empty afterwards.
    pub fn release(&mut self) -> Option<NonNull<T>>
    {
        self.data.take()
    }

    pub fn into_raw(mut self) -> Option<NonNull<T>>
    {
        self.release()
    }

    pub fn into_box(self) -> Option<Box<T>>
    {
        self.into_raw().map(|data| {
            unsafe { Box::from_raw(data.as_ptr()) }
        })
    }

    pub fn into_shared(self) -> Shared<T>
    {
        Shared::from_unique(self)
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> Option<NonNull<T>>
    {
        self.data
    }

    pub fn get(&self) -> Option<&T>
    {
        self.data.map(|data| {
            unsafe { &*data.as_ptr() }
        })
    }

    pub fn get_mut(&mut self) -> Option<&mut T>
    {
        self.data.map(|data| {
            unsafe { &mut *data.as_ptr() }
        })
    }

    pub fn is_some(&self) -> bool
    {
        self.data.is_some()
    }

    pub fn is_empty(&self) -> bool
    {
        self.data.is_none()
    }

    /// Moves the value out into a new owner, leaving this one empty.
    pub fn take(&mut self) -> Unique<T>
    {
        Unique { data : self.data.take(), _ph : PhantomData }
    }

    pub fn swap(&mut self, other : &mut Unique<T>)
    {
        mem::swap(&mut self.data, &mut other.data);
    }

    /// Replaces the owned value with the one in `rhs`, destroying the previous value.
    pub fn assign(&mut self, mut rhs : Unique<T>)
    {
        self.swap(&mut rhs);
    }
}

impl <T : ?Sized> Deref for Unique<T> {
    type Target = T;
    #[inline(always)]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => panic!("dereferenced an empty Unique"),
        }
    }
}

impl <T : ?Sized> DerefMut for Unique<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        match self.get_mut() {
            Some(value) => value,
            None => panic!("dereferenced an empty Unique"),
        }
    }
}

impl <T : ?Sized> Drop for Unique<T> {
    #[inline(always)]
    fn drop(&mut self) {
        if let Some(data) = self.data.take() {
            unsafe {
                drop(Box::from_raw(data.as_ptr()));
            }
        }
    }
}

impl <T : ?Sized> Default for Unique<T> {
    fn default() -> Self
    {
        Unique::empty()
    }
}

impl <T : ?Sized> From<Box<T>> for Unique<T> {
    fn from(x : Box<T>) -> Self
    {
        Unique::from_box(x)
    }
}

impl <T : ?Sized + fmt::Debug> fmt::Debug for Unique<T> {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self.get() {
            Some(value) => f.debug_tuple("Unique").field(&value).finish(),
            None => f.write_str("Unique(<empty>)"),
        }
    }
}
