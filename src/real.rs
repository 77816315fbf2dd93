// Scalar abstraction shared by every control strategy
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use core::fmt::Debug;

use num_traits::Float;

/// A floating-point scalar the controllers can compute with.
///
/// This is a trait alias: every `Float` that is also `Debug + Send + Sync + 'static` implements it,
/// which in practice means `f32` and `f64`.
pub trait Real: Float + Debug + Send + Sync + 'static {
    /// Converts an `f64` literal into `Self`.
    ///
    /// Exact for `f64`, rounds to nearest for `f32`. Never fails for the primitive float types;
    /// a type that cannot represent the value yields NaN.
    #[inline]
    fn constant(value: f64) -> Self {
        Self::from(value).unwrap_or_else(Self::nan)
    }
}

impl<T> Real for T where T: Float + Debug + Send + Sync + 'static {}
