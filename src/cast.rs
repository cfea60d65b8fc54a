//! Conversions between handle types. Every cast returns a co-owner of its source: the count goes up by one
//! and the value stays alive until both handles are gone.

use core::any::{self, Any};
use core::fmt;
use core::ops::Deref;
use core::ptr::NonNull;

use crate::error::SharedError;
use crate::shared::{Provenance, Shared};

/// Gives access to the dynamic type behind a possibly unsized view. Add it as a supertrait of a polymorphic
/// base trait to allow checked downcasts from `Shared<dyn Base>`.
pub trait AsAny : Any {
    fn as_any(&self) -> &dyn Any;
}

impl <T : Any> AsAny for T {
    fn as_any(&self) -> &dyn Any
    {
        self
    }
}

impl AsAny for dyn Any {
    fn as_any(&self) -> &dyn Any
    {
        self
    }
}

/// A value viewed as read-only. Handles of `Shared<ReadOnly<T>>` never hand out `&mut T`, even to the sole
/// owner. `const_pointer_cast` removes the qualifier again.
#[repr(transparent)]
pub struct ReadOnly<T : ?Sized>(T);

impl <T : ?Sized> Deref for ReadOnly<T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.0
    }
}

impl <T : ?Sized + fmt::Debug> fmt::Debug for ReadOnly<T> {
    fn fmt(&self, f : &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_tuple("ReadOnly").field(&&self.0).finish()
    }
}

/// Compile-time checked conversion: upcast to a trait object (`|c| c`), projection to a field, or any other
/// conversion expressible on references. The resulting handle is never writable.
///
/// The source view must be `'static`: the new handle may outlive every lifetime `U` borrows from, and the value
/// still runs its destructor when the last owner goes.
/// ```compile_fail
/// use shared_owner::*;
///
/// struct Holder<'a> { text : &'a String, n : u32 }
///
/// let text = String::from("borrowed");
/// let holder = Shared::new(Holder { text : &text, n : 1 });
/// let n = static_pointer_cast(&holder, |holder| &holder.n);
/// drop(holder);
/// drop(text);
/// assert_eq!(*n, 1);
/// ```
pub fn static_pointer_cast<T : ?Sized, U : ?Sized + 'static, F>(src : &Shared<U>, f : F) -> Shared<T>
where F : FnOnce(&U) -> &T
{
    match src.get() {
        Some(value) => {
            let ptr = NonNull::from(f(value));
            src.alias(ptr, Provenance::Borrowed)
        }
        None => Shared::empty(),
    }
}

fn checked_downcast<T : Any, U : ?Sized + AsAny>(src : &Shared<U>) -> Result<Shared<T>, SharedError>
{
    let owner = src.owner().ok_or(SharedError::Empty)?;
    let value = unsafe { owner.ptr.as_ref() };
    if !value.as_any().is::<T>() {
        log::debug!("rejected downcast of {:p} to {}", owner.ptr, any::type_name::<T>());
        return Err(SharedError::TypeMismatch { expected : any::type_name::<T>() });
    }
    // the data pointer of a trait object is the address of the concrete value
    Ok(src.alias(owner.ptr.cast::<T>(), owner.provenance))
}

/// Runtime checked downcast. Returns an empty handle, and leaves the count untouched, when `src` is empty or
/// does not hold a `T`.
pub fn dynamic_pointer_cast<T : Any, U : ?Sized + AsAny>(src : &Shared<U>) -> Shared<T>
{
    checked_downcast(src).unwrap_or_default()
}

/// Like `dynamic_pointer_cast`, but tells an empty source apart from a type mismatch.
pub fn try_dynamic_pointer_cast<T : Any, U : ?Sized + AsAny>(src : &Shared<U>) -> Result<Shared<T>, SharedError>
{
    checked_downcast(src)
}

/// Reinterprets the address as a `T` without any check.
/// # Safety
/// The value behind `src` must be valid when read as a `T` for as long as the returned handle lives.
/// Destruction is unaffected: the value is still dropped as the type it was allocated with.
pub unsafe fn reinterpret_pointer_cast<T, U : ?Sized>(src : &Shared<U>) -> Shared<T>
{
    match src.owner() {
        Some(owner) => src.alias(owner.ptr.cast::<T>(), owner.provenance),
        None => Shared::empty(),
    }
}

/// Removes the read-only qualifier. Works for unsized values too, e.g. `Shared<ReadOnly<str>>`.
pub fn const_pointer_cast<T : ?Sized>(src : &Shared<ReadOnly<T>>) -> Shared<T>
{
    match src.owner() {
        Some(owner) => {
            let provenance = match owner.provenance {
                Provenance::Frozen => Provenance::Owned,
                other => other,
            };
            // ReadOnly<T> is repr(transparent), so the metadata of a fat pointer carries over
            let ptr = unsafe { NonNull::new_unchecked(owner.ptr.as_ptr() as *mut T) };
            src.alias(ptr, provenance)
        }
        None => Shared::empty(),
    }
}

/// Adds the read-only qualifier.
pub fn read_only<T : ?Sized>(src : &Shared<T>) -> Shared<ReadOnly<T>>
{
    match src.owner() {
        Some(owner) => {
            let provenance = match owner.provenance {
                Provenance::Owned => Provenance::Frozen,
                other => other,
            };
            let ptr = unsafe { NonNull::new_unchecked(owner.ptr.as_ptr() as *mut ReadOnly<T>) };
            src.alias(ptr, provenance)
        }
        None => Shared::empty(),
    }
}

impl <U : ?Sized + AsAny> Shared<U> {
    /// Consuming downcast: moves ownership into a `Shared<T>` if the value is a `T`, otherwise gives `self`
    /// back unchanged.
    pub fn downcast<T : Any>(self) -> Result<Shared<T>, Shared<U>>
    {
        match checked_downcast::<T, U>(&self) {
            Ok(cast) => Ok(cast),
            Err(_) => Err(self),
        }
    }
}
