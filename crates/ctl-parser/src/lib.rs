//! GrADS control (CTL) descriptor parsing for binary precipitation archives.
//!
//! A CTL descriptor is a small line-oriented ASCII file published alongside a
//! binary archive. It declares the grid geometry, byte order, missing-value
//! sentinel, and nominal start date that every raw daily file in the archive
//! shares:
//!
//! ```text
//! DSET ../0.25deg-DLY_00Z/%y4/%y4%m2/CMORPH_V1.0_RAW_0.25deg-DLY_00Z_%y4%m2%d2
//! TITLE  CMORPH Version 1.0BETA Version, daily precip from 00Z-24Z
//! OPTIONS template little_endian
//! UNDEF  -999.0
//! XDEF 1440 LINEAR    0.125  0.25
//! YDEF  480 LINEAR  -59.875  0.25
//! TDEF 99999 LINEAR  01jan1998 1dy
//! VARS 1
//! cmorph   1   99 yyyyy CMORPH Version 1.o daily precipitation (mm)
//! ENDVARS
//! ```
//!
//! [`parse_descriptor`] turns that text into a validated [`GridDescriptor`].
//! The parser performs no I/O; the caller supplies the text, whether it came
//! from a local file or a freshly downloaded copy.

pub mod descriptor;
pub mod error;
pub mod parser;

pub use descriptor::{ByteOrder, GridDescriptor, TdefPrefix};
pub use error::{CtlError, Result};
pub use parser::parse_descriptor;
