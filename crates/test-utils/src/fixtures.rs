//! Canned CTL descriptor texts shared across the workspace tests.

/// Descriptor for the full-resolution 0.25-degree global grid.
pub const GLOBAL_DESCRIPTOR: &str = "\
DSET ../0.25deg-DLY_00Z/%y4/%y4%m2/CMORPH_V1.0_RAW_0.25deg-DLY_00Z_%y4%m2%d2
TITLE  CMORPH Version 1.0BETA Version, daily precip from 00Z-24Z
OPTIONS template little_endian
UNDEF  -999.0
XDEF 1440 LINEAR    0.125  0.25
YDEF  480 LINEAR  -59.875  0.25
ZDEF   01 LEVELS 1
TDEF 99999 LINEAR  01jan1998 1dy
VARS 1
cmorph   1   99 yyyyy CMORPH Version 1.o daily precipitation (mm)
ENDVARS
";

/// Tiny 4-column, 3-row descriptor for fast writer tests.
pub const TINY_DESCRIPTOR: &str = "\
DSET ../0.25deg-DLY_00Z/%y4/%y4%m2/CMORPH_V1.0_RAW_0.25deg-DLY_00Z_%y4%m2%d2
TITLE  CMORPH Version 1.0BETA Version, daily precip from 00Z-24Z
OPTIONS template little_endian
UNDEF  -999.0
XDEF 4 LINEAR    0.125  0.25
YDEF 3 LINEAR  -59.875  0.25
ZDEF   01 LEVELS 1
TDEF 99999 LINEAR  01jan1998 1dy
VARS 1
cmorph   1   99 yyyyy CMORPH Version 1.o daily precipitation (mm)
ENDVARS
";

/// Coarse 2-degree descriptor whose extent spans the continental US box,
/// small enough for end-to-end subsetting tests (80 columns, 40 rows).
pub const CONUS_SPAN_DESCRIPTOR: &str = "\
DSET ../2.0deg-DLY_00Z/%y4/%y4%m2/CMORPH_TEST_2.0deg-DLY_00Z_%y4%m2%d2
TITLE  Coarse test grid spanning the continental US
OPTIONS template little_endian
UNDEF  -999.0
XDEF 80 LINEAR  200.125  2.0
YDEF 40 LINEAR    0.125  2.0
ZDEF   01 LEVELS 1
TDEF 99999 LINEAR  01jan1998 1dy
VARS 1
cmorph   1   99 yyyyy Coarse test precipitation (mm)
ENDVARS
";

/// Gauge-adjusted descriptor whose TDEF start date carries the hour marker.
pub const ADJUSTED_DESCRIPTOR: &str = "\
DSET ../0.25deg-DLY_00Z/%y4/%y4%m2/CMORPH_V1.0_ADJ_0.25deg-DLY_00Z_%y4%m2%d2
TITLE  CMORPH Version 1.0, gauge-adjusted daily precip from 00Z-24Z
OPTIONS template little_endian
UNDEF  -999.0
XDEF 1440 LINEAR    0.125  0.25
YDEF  480 LINEAR  -59.875  0.25
ZDEF   01 LEVELS 1
TDEF 99999 LINEAR  00z01jan1998 1dy
VARS 1
cmorph   1   99 yyyyy CMORPH gauge-adjusted daily precipitation (mm)
ENDVARS
";

/// Missing-value sentinel used by every fixture descriptor.
pub const FILL_VALUE: f32 = -999.0;
