//! Parameter code translation.
//!
//! Both directions are flat static tables searched by tuple, so partial
//! coverage shows up as an explicit `None` instead of a fall-through into a
//! neighboring case. Center-specific rows are consulted before the generic
//! WMO rows.

use log::warn;

/// (discipline, parameter category, parameter number)
pub type Grib2Param = (u8, u8, u8);

/// Center wildcard for reverse rows that apply regardless of origin.
const ANY: u16 = u16::MAX;

/// GRIB1 (parameter, center, table version) rows with a center-specific
/// GRIB2 meaning.
const FORWARD_SPECIFIC: &[(u8, u8, u8, Grib2Param)] = &[
    (1, 98, 228, (0, 7, 7)),
    (3, 98, 228, (10, 0, 17)),
    (8, 78, 174, (2, 0, 34)),
    (10, 98, 200, (0, 14, 2)),
    (21, 98, 128, (0, 0, 28)),
    (22, 98, 128, (0, 3, 31)),
    (23, 98, 128, (0, 2, 45)),
    (30, 98, 203, (0, 7, 8)),
    (33, 98, 201, (0, 1, 82)),
    (33, 98, 203, (0, 2, 46)),
    (41, 98, 201, (0, 1, 78)),
    (46, 98, 202, (0, 3, 20)),
    (47, 98, 202, (0, 3, 24)),
    (48, 98, 202, (0, 3, 21)),
    (49, 98, 202, (0, 3, 22)),
    (54, 98, 2, (0, 1, 64)),
    (58, 98, 2, (0, 1, 70)),
    (59, 98, 128, (0, 7, 6)),
    (61, 98, 202, (2, 0, 28)),
    (62, 98, 202, (2, 0, 32)),
    (68, 98, 201, (0, 6, 26)),
    (69, 98, 201, (0, 6, 27)),
    (75, 98, 128, (0, 1, 85)),
    (75, 98, 202, (2, 0, 29)),
    (76, 98, 2, (0, 1, 69)),
    (76, 98, 128, (0, 1, 86)),
    (76, 98, 202, (2, 0, 30)),
    (77, 98, 128, (0, 2, 32)),
    (78, 98, 202, (2, 0, 31)),
    (99, 98, 203, (0, 19, 25)),
    (100, 98, 201, (0, 1, 77)),
    (109, 98, 162, (0, 0, 20)),
    (109, 98, 228, (0, 6, 13)),
    (111, 98, 201, (0, 1, 76)),
    (112, 98, 201, (0, 1, 55)),
    (121, 98, 228, (0, 7, 2)),
    (123, 98, 228, (0, 7, 4)),
    (131, 7, 2, (0, 1, 70)),
    (131, 7, 129, (0, 1, 43)),
    (132, 7, 2, (0, 7, 11)),
    (132, 7, 129, (0, 6, 21)),
    (133, 7, 2, (0, 7, 2)),
    (133, 7, 129, (0, 1, 44)),
    (133, 98, 201, (0, 1, 61)),
    (134, 7, 2, (0, 7, 5)),
    (134, 7, 129, (0, 6, 16)),
    (135, 7, 2, (0, 1, 38)),
    (135, 7, 129, (0, 1, 21)),
    (136, 7, 2, (0, 2, 25)),
    (136, 7, 129, (0, 1, 69)),
    (137, 7, 129, (0, 1, 70)),
    (137, 7, 131, (0, 17, 0)),
    (138, 7, 129, (0, 1, 45)),
    (139, 7, 129, (0, 1, 46)),
    (140, 7, 2, (0, 1, 33)),
    (140, 7, 129, (0, 6, 20)),
    (140, 98, 203, (0, 7, 3)),
    (141, 7, 2, (0, 1, 34)),
    (142, 7, 2, (0, 1, 35)),
    (143, 7, 2, (0, 1, 36)),
    (144, 7, 2, (2, 0, 9)),
    (144, 7, 128, (10, 3, 2)),
    (145, 7, 131, (0, 1, 41)),
    (146, 7, 2, (0, 6, 15)),
    (146, 98, 200, (0, 6, 15)),
    (147, 7, 2, (0, 3, 16)),
    (147, 98, 201, (0, 19, 24)),
    (147, 98, 254, (0, 2, 27)),
    (148, 7, 2, (0, 3, 17)),
    (148, 98, 254, (0, 2, 28)),
    (152, 98, 201, (0, 19, 11)),
    (153, 7, 2, (0, 1, 22)),
    (153, 98, 201, (0, 2, 31)),
    (154, 7, 2, (0, 14, 1)),
    (155, 7, 2, (2, 0, 10)),
    (155, 98, 200, (2, 0, 10)),
    (156, 7, 2, (0, 7, 7)),
    (157, 7, 2, (0, 7, 6)),
    (158, 7, 2, (0, 19, 11)),
    (159, 7, 130, (0, 19, 17)),
    (160, 7, 2, (0, 4, 53)),
    (160, 7, 130, (2, 3, 5)),
    (163, 7, 2, (0, 5, 8)),
    (170, 7, 2, (0, 1, 24)),
    (170, 7, 130, (0, 19, 18)),
    (171, 7, 2, (0, 1, 25)),
    (171, 7, 130, (2, 3, 6)),
    (171, 98, 201, (0, 0, 19)),
    (171, 98, 228, (2, 0, 26)),
    (172, 7, 2, (0, 2, 26)),
    (174, 7, 140, (0, 6, 25)),
    (178, 7, 2, (0, 1, 23)),
    (180, 7, 130, (0, 1, 17)),
    (180, 98, 128, (0, 2, 38)),
    (180, 98, 202, (0, 14, 1)),
    (181, 7, 130, (2, 0, 15)),
    (181, 98, 128, (0, 2, 37)),
    (182, 7, 130, (2, 0, 28)),
    (184, 7, 130, (0, 19, 19)),
    (189, 7, 2, (0, 0, 15)),
    (190, 7, 2, (0, 7, 8)),
    (191, 7, 133, (0, 6, 33)),
    (192, 7, 133, (10, 191, 1)),
    (193, 7, 131, (0, 0, 21)),
    (194, 7, 2, (0, 1, 39)),
    (195, 7, 128, (10, 4, 4)),
    (196, 7, 2, (0, 2, 27)),
    (196, 7, 128, (10, 4, 5)),
    (196, 7, 130, (2, 0, 7)),
    (197, 7, 2, (0, 2, 28)),
    (197, 7, 128, (10, 4, 6)),
    (200, 98, 201, (2, 0, 13)),
    (202, 98, 133, (0, 3, 27)),
    (202, 98, 200, (2, 0, 6)),
    (203, 7, 130, (2, 0, 16)),
    (203, 98, 201, (0, 0, 18)),
    (204, 7, 2, (0, 4, 7)),
    (204, 98, 200, (0, 4, 7)),
    (205, 7, 2, (0, 5, 3)),
    (205, 98, 200, (0, 5, 3)),
    (206, 7, 130, (0, 15, 3)),
    (207, 7, 2, (2, 0, 11)),
    (208, 7, 2, (2, 0, 12)),
    (209, 7, 133, (0, 3, 28)),
    (211, 7, 2, (0, 4, 8)),
    (211, 98, 200, (0, 4, 8)),
    (212, 7, 2, (0, 5, 4)),
    (212, 98, 200, (0, 5, 4)),
    (212, 98, 201, (2, 0, 16)),
    (214, 7, 2, (0, 1, 37)),
    (218, 7, 129, (0, 1, 27)),
    (219, 7, 129, (0, 6, 13)),
    (219, 7, 130, (2, 0, 17)),
    (219, 98, 200, (0, 2, 21)),
    (221, 7, 2, (0, 3, 18)),
    (222, 7, 2, (0, 3, 15)),
    (223, 7, 2, (2, 0, 13)),
    (223, 7, 129, (0, 1, 65)),
    (224, 7, 2, (2, 3, 0)),
    (224, 7, 129, (0, 1, 66)),
    (225, 7, 129, (0, 1, 67)),
    (226, 7, 2, (2, 0, 14)),
    (226, 7, 129, (0, 1, 68)),
    (227, 7, 129, (0, 7, 15)),
    (228, 7, 2, (0, 1, 40)),
    (229, 7, 2, (0, 0, 16)),
    (230, 7, 2, (0, 3, 19)),
    (230, 7, 130, (2, 3, 7)),
    (230, 98, 201, (0, 15, 1)),
    (231, 7, 130, (2, 3, 8)),
    (233, 98, 140, (10, 0, 16)),
    (234, 7, 2, (1, 0, 5)),
    (235, 7, 2, (1, 0, 6)),
    (235, 98, 128, (0, 0, 17)),
    (238, 7, 2, (0, 1, 42)),
    (239, 7, 2, (0, 0, 18)),
    (240, 7, 129, (0, 16, 3)),
    (240, 7, 130, (2, 3, 9)),
    (246, 7, 130, (2, 0, 18)),
    (246, 98, 128, (0, 1, 83)),
    (247, 7, 130, (2, 0, 19)),
    (247, 98, 128, (0, 1, 84)),
    (248, 7, 130, (2, 0, 20)),
    (248, 98, 128, (0, 6, 32)),
    (249, 7, 130, (2, 0, 21)),
    (250, 7, 129, (2, 4, 2)),
    (252, 7, 2, (0, 2, 29)),
    (253, 7, 2, (0, 2, 30)),
    (253, 98, 140, (10, 0, 44)),
    (254, 7, 2, (0, 7, 12)),
];

/// WMO parameter table 3 rows that translate regardless of center.
const FORWARD_GENERIC: &[(u8, Grib2Param)] = &[
    (1, (0, 3, 0)),
    (2, (0, 3, 1)),
    (3, (0, 3, 2)),
    (4, (0, 2, 14)),
    (5, (0, 3, 3)),
    (6, (0, 3, 4)),
    (7, (0, 3, 5)),
    (8, (0, 3, 6)),
    (9, (0, 3, 7)),
    (10, (0, 14, 0)),
    (11, (0, 0, 0)),
    (12, (0, 0, 1)),
    (13, (0, 0, 2)),
    (14, (0, 0, 3)),
    (15, (0, 0, 4)),
    (16, (0, 0, 5)),
    (17, (0, 0, 6)),
    (18, (0, 0, 7)),
    (19, (0, 0, 8)),
    (20, (0, 19, 0)),
    (21, (0, 15, 6)),
    (22, (0, 15, 7)),
    (23, (0, 15, 8)),
    (24, (0, 7, 0)),
    (25, (0, 0, 9)),
    (26, (0, 3, 8)),
    (27, (0, 3, 9)),
    (28, (10, 0, 0)),
    (29, (10, 0, 1)),
    (30, (10, 0, 2)),
    (31, (0, 2, 0)),
    (32, (0, 2, 1)),
    (33, (0, 2, 2)),
    (34, (0, 2, 3)),
    (35, (0, 2, 4)),
    (36, (0, 2, 5)),
    (37, (0, 2, 6)),
    (38, (0, 2, 7)),
    (39, (0, 2, 8)),
    (40, (0, 2, 9)),
    (41, (0, 2, 10)),
    (42, (0, 2, 11)),
    (43, (0, 2, 12)),
    (44, (0, 2, 13)),
    (45, (0, 2, 15)),
    (46, (0, 2, 16)),
    (47, (10, 1, 0)),
    (48, (10, 1, 1)),
    (49, (10, 1, 2)),
    (50, (10, 1, 3)),
    (51, (0, 1, 0)),
    (52, (0, 1, 1)),
    (53, (0, 1, 2)),
    (54, (0, 1, 3)),
    (55, (0, 1, 4)),
    (56, (0, 1, 5)),
    (57, (0, 1, 6)),
    (58, (0, 6, 0)),
    (59, (0, 1, 7)),
    (60, (0, 19, 2)),
    (61, (0, 1, 8)),
    (62, (0, 1, 9)),
    (63, (0, 1, 10)),
    (64, (0, 1, 12)),
    (65, (0, 1, 13)),
    (66, (0, 1, 11)),
    (67, (0, 19, 3)),
    (68, (10, 4, 2)),
    (69, (10, 4, 0)),
    (70, (10, 4, 1)),
    (71, (0, 6, 1)),
    (72, (0, 6, 2)),
    (73, (0, 6, 3)),
    (74, (0, 6, 4)),
    (75, (0, 6, 5)),
    (76, (0, 6, 6)),
    (77, (0, 7, 1)),
    (78, (0, 1, 14)),
    (79, (0, 1, 15)),
    (80, (10, 3, 0)),
    (81, (1, 2, 8)),
    (82, (10, 3, 1)),
    (83, (2, 0, 1)),
    (84, (0, 19, 1)),
    (85, (2, 0, 2)),
    (86, (2, 0, 3)),
    (87, (2, 0, 4)),
    (88, (10, 4, 3)),
    (89, (0, 3, 10)),
    (90, (2, 0, 5)),
    (91, (1, 2, 7)),
    (92, (10, 2, 1)),
    (93, (10, 2, 2)),
    (94, (10, 2, 3)),
    (95, (10, 2, 4)),
    (96, (10, 2, 5)),
    (97, (10, 2, 6)),
    (98, (10, 2, 7)),
    (99, (0, 1, 16)),
    (100, (10, 0, 3)),
    (101, (10, 0, 4)),
    (102, (10, 0, 5)),
    (103, (10, 0, 6)),
    (104, (10, 0, 7)),
    (105, (10, 0, 8)),
    (106, (10, 0, 9)),
    (107, (10, 0, 10)),
    (108, (10, 0, 11)),
    (109, (10, 0, 12)),
    (110, (10, 0, 13)),
    (111, (0, 4, 0)),
    (112, (0, 5, 0)),
    (113, (0, 4, 1)),
    (114, (0, 5, 1)),
    (115, (0, 5, 2)),
    (116, (0, 4, 2)),
    (117, (0, 4, 3)),
    (118, (0, 4, 4)),
    (119, (0, 4, 5)),
    (120, (0, 4, 6)),
    (121, (0, 0, 10)),
    (122, (0, 0, 11)),
    (123, (0, 2, 20)),
    (124, (0, 2, 17)),
    (125, (0, 2, 18)),
    (126, (0, 2, 19)),
];

/// GRIB1 → GRIB2. Returns `None` for unmapped codes; the encoder then
/// degrades all three fields to 255.
pub fn grib2_parameter(param: u8, center: u8, table_ver: u8) -> Option<Grib2Param> {
    let mapped = FORWARD_SPECIFIC
        .iter()
        .find(|row| row.0 == param && row.1 == center && row.2 == table_ver)
        .map(|row| row.3)
        .or_else(|| {
            FORWARD_GENERIC
                .iter()
                .find(|row| row.0 == param)
                .map(|row| row.1)
        });
    if let Some((_, 14, _)) = mapped {
        // trace-gas rows sat in a structurally suspect region of the
        // reference tables; keep an eye on messages that reach them
        warn!(
            "parameter {} (center {}, table {}) maps into the trace-gas category",
            param, center, table_ver
        );
    }
    mapped
}

/// GRIB2 (discipline, category, number) rows keyed with an optional
/// originating-center gate, mapping to (table version, parameter code).
const REVERSE: &[(u8, u8, u8, u16, (u8, u8))] = &[
    // discipline 0: meteorological, temperature
    (0, 0, 0, ANY, (3, 11)),
    (0, 0, 1, ANY, (3, 12)),
    (0, 0, 2, ANY, (3, 13)),
    (0, 0, 3, ANY, (3, 14)),
    (0, 0, 4, ANY, (3, 15)),
    (0, 0, 5, ANY, (3, 16)),
    (0, 0, 6, ANY, (3, 17)),
    (0, 0, 7, ANY, (3, 18)),
    (0, 0, 8, ANY, (3, 19)),
    (0, 0, 9, ANY, (3, 25)),
    (0, 0, 10, ANY, (3, 121)),
    (0, 0, 11, ANY, (3, 122)),
    (0, 0, 21, 7, (131, 193)),
    (0, 0, 192, 7, (3, 229)),
    // moisture
    (0, 1, 0, ANY, (3, 51)),
    (0, 1, 1, ANY, (3, 52)),
    (0, 1, 2, ANY, (3, 53)),
    (0, 1, 3, ANY, (3, 54)),
    (0, 1, 4, ANY, (3, 55)),
    (0, 1, 5, ANY, (3, 56)),
    (0, 1, 6, ANY, (3, 57)),
    (0, 1, 7, ANY, (3, 59)),
    (0, 1, 8, ANY, (3, 61)),
    (0, 1, 9, ANY, (3, 62)),
    (0, 1, 10, ANY, (3, 63)),
    (0, 1, 11, ANY, (3, 66)),
    (0, 1, 12, ANY, (3, 64)),
    (0, 1, 13, ANY, (3, 65)),
    (0, 1, 14, ANY, (3, 78)),
    (0, 1, 15, ANY, (3, 79)),
    (0, 1, 16, ANY, (3, 99)),
    (0, 1, 22, 7, (3, 153)),
    (0, 1, 39, 7, (3, 194)),
    (0, 1, 192, 7, (3, 140)),
    (0, 1, 193, 7, (3, 141)),
    (0, 1, 194, 7, (3, 142)),
    (0, 1, 195, 7, (3, 143)),
    (0, 1, 196, 7, (3, 214)),
    (0, 1, 197, 7, (3, 135)),
    (0, 1, 199, 7, (3, 228)),
    (0, 1, 200, 7, (3, 145)),
    (0, 1, 201, 7, (3, 238)),
    (0, 1, 206, 7, (3, 186)),
    (0, 1, 207, 7, (3, 198)),
    (0, 1, 208, 7, (3, 239)),
    (0, 1, 213, 7, (3, 243)),
    (0, 1, 214, 7, (3, 245)),
    (0, 1, 215, 7, (3, 249)),
    (0, 1, 216, 7, (3, 159)),
    // momentum
    (0, 2, 0, ANY, (3, 31)),
    (0, 2, 1, ANY, (3, 32)),
    (0, 2, 2, ANY, (3, 33)),
    (0, 2, 3, ANY, (3, 34)),
    (0, 2, 4, ANY, (3, 35)),
    (0, 2, 5, ANY, (3, 36)),
    (0, 2, 6, ANY, (3, 37)),
    (0, 2, 7, ANY, (3, 38)),
    (0, 2, 8, ANY, (3, 39)),
    (0, 2, 9, ANY, (3, 40)),
    (0, 2, 10, ANY, (3, 41)),
    (0, 2, 11, ANY, (3, 42)),
    (0, 2, 12, ANY, (3, 43)),
    (0, 2, 13, ANY, (3, 44)),
    (0, 2, 14, ANY, (3, 4)),
    (0, 2, 15, ANY, (3, 45)),
    (0, 2, 16, ANY, (3, 46)),
    (0, 2, 17, ANY, (3, 124)),
    (0, 2, 18, ANY, (3, 125)),
    (0, 2, 19, ANY, (3, 126)),
    (0, 2, 20, ANY, (3, 123)),
    (0, 2, 22, 7, (3, 180)),
    (0, 2, 192, 7, (3, 136)),
    (0, 2, 193, 7, (3, 172)),
    (0, 2, 194, 7, (3, 196)),
    (0, 2, 195, 7, (3, 197)),
    (0, 2, 196, 7, (3, 252)),
    (0, 2, 197, 7, (3, 253)),
    (0, 2, 224, 7, (129, 241)),
    // mass
    (0, 3, 0, ANY, (3, 1)),
    (0, 3, 1, ANY, (3, 2)),
    (0, 3, 2, ANY, (3, 3)),
    (0, 3, 3, ANY, (3, 5)),
    (0, 3, 4, ANY, (3, 6)),
    (0, 3, 5, ANY, (3, 7)),
    (0, 3, 6, ANY, (3, 8)),
    (0, 3, 7, ANY, (3, 9)),
    (0, 3, 8, ANY, (3, 26)),
    (0, 3, 9, ANY, (3, 27)),
    (0, 3, 10, ANY, (3, 89)),
    (0, 3, 192, 7, (3, 130)),
    (0, 3, 193, 7, (3, 222)),
    (0, 3, 194, 7, (3, 147)),
    (0, 3, 195, 7, (3, 148)),
    (0, 3, 196, 7, (3, 221)),
    (0, 3, 197, 7, (3, 230)),
    (0, 3, 198, 7, (3, 129)),
    (0, 3, 199, 7, (3, 137)),
    (0, 3, 200, 7, (129, 141)),
    // short-wave radiation
    (0, 4, 0, ANY, (3, 111)),
    (0, 4, 1, ANY, (3, 113)),
    (0, 4, 2, ANY, (3, 116)),
    (0, 4, 3, ANY, (3, 117)),
    (0, 4, 4, ANY, (3, 118)),
    (0, 4, 5, ANY, (3, 119)),
    (0, 4, 6, ANY, (3, 120)),
    (0, 4, 192, 7, (3, 204)),
    (0, 4, 193, 7, (3, 211)),
    (0, 4, 196, 7, (3, 161)),
    // long-wave radiation
    (0, 5, 0, ANY, (3, 112)),
    (0, 5, 1, ANY, (3, 114)),
    (0, 5, 2, ANY, (3, 115)),
    (0, 5, 192, 7, (3, 205)),
    (0, 5, 193, 7, (3, 212)),
    // cloud
    (0, 6, 0, ANY, (3, 58)),
    (0, 6, 1, ANY, (3, 71)),
    (0, 6, 2, ANY, (3, 72)),
    (0, 6, 3, ANY, (3, 73)),
    (0, 6, 4, ANY, (3, 74)),
    (0, 6, 5, ANY, (3, 75)),
    (0, 6, 6, ANY, (3, 76)),
    (0, 6, 25, 74, (140, 174)),
    (0, 6, 192, 7, (3, 213)),
    (0, 6, 193, 7, (3, 146)),
    (0, 6, 201, 7, (133, 191)),
    // thermodynamic stability indices
    (0, 7, 0, ANY, (3, 24)),
    (0, 7, 1, ANY, (3, 77)),
    (0, 7, 6, 7, (3, 157)),
    (0, 7, 7, 7, (3, 156)),
    (0, 7, 8, 7, (3, 190)),
    (0, 7, 192, 7, (3, 131)),
    (0, 7, 193, 7, (3, 132)),
    (0, 7, 194, 7, (3, 254)),
    // trace gases
    (0, 14, 0, ANY, (3, 10)),
    (0, 14, 192, 7, (3, 154)),
    // radar
    (0, 15, 6, ANY, (3, 21)),
    (0, 15, 7, ANY, (3, 22)),
    (0, 15, 8, ANY, (3, 23)),
    // forecast radar imagery
    (0, 16, 195, 7, (129, 211)),
    (0, 16, 196, 7, (129, 212)),
    // physical atmospheric properties
    (0, 19, 0, ANY, (3, 20)),
    (0, 19, 1, ANY, (3, 84)),
    (0, 19, 2, ANY, (3, 60)),
    (0, 19, 3, ANY, (3, 67)),
    (0, 19, 204, 7, (3, 209)),
    // discipline 1: hydrology
    (1, 0, 192, 7, (3, 234)),
    (1, 0, 193, 7, (3, 235)),
    (1, 1, 192, 7, (3, 195)),
    (1, 1, 193, 7, (3, 194)),
    // discipline 2: land surface
    (2, 0, 0, ANY, (3, 81)),
    (2, 0, 1, ANY, (3, 83)),
    (2, 0, 2, ANY, (3, 85)),
    (2, 0, 3, ANY, (3, 86)),
    (2, 0, 4, ANY, (3, 87)),
    (2, 0, 5, ANY, (3, 90)),
    (2, 0, 192, 7, (3, 144)),
    (2, 0, 193, 7, (3, 155)),
    (2, 0, 194, 7, (3, 207)),
    (2, 0, 195, 7, (3, 208)),
    (2, 0, 196, 7, (3, 223)),
    (2, 0, 197, 7, (3, 226)),
    (2, 0, 198, 7, (3, 225)),
    (2, 0, 201, 7, (130, 219)),
    (2, 0, 207, 7, (3, 201)),
    (2, 3, 203, 7, (130, 220)),
    (2, 4, 2, 7, (129, 250)),
    // discipline 10: oceanographic, waves
    (10, 0, 0, ANY, (3, 28)),
    (10, 0, 1, ANY, (3, 29)),
    (10, 0, 2, ANY, (3, 30)),
    (10, 0, 3, ANY, (3, 100)),
    (10, 0, 4, ANY, (3, 101)),
    (10, 0, 5, ANY, (3, 102)),
    (10, 0, 6, ANY, (3, 103)),
    (10, 0, 7, ANY, (3, 104)),
    (10, 0, 8, ANY, (3, 105)),
    (10, 0, 9, ANY, (3, 106)),
    (10, 0, 10, ANY, (3, 107)),
    (10, 0, 11, ANY, (3, 108)),
    (10, 0, 12, ANY, (3, 109)),
    (10, 0, 13, ANY, (3, 110)),
    // currents
    (10, 1, 0, ANY, (3, 47)),
    (10, 1, 1, ANY, (3, 48)),
    (10, 1, 2, ANY, (3, 49)),
    (10, 1, 3, ANY, (3, 50)),
    // ice
    (10, 2, 0, ANY, (3, 91)),
    (10, 2, 1, ANY, (3, 92)),
    (10, 2, 2, ANY, (3, 93)),
    (10, 2, 3, ANY, (3, 94)),
    (10, 2, 4, ANY, (3, 95)),
    (10, 2, 5, ANY, (3, 96)),
    (10, 2, 6, ANY, (3, 97)),
    (10, 2, 7, ANY, (3, 98)),
    // surface properties
    (10, 3, 0, ANY, (3, 80)),
    (10, 3, 1, ANY, (3, 82)),
    // sub-surface properties
    (10, 4, 0, ANY, (3, 69)),
    (10, 4, 1, ANY, (3, 70)),
    (10, 4, 2, ANY, (3, 68)),
    (10, 4, 3, ANY, (3, 88)),
];

/// GRIB2 → GRIB1. `spatial_type` is the spatial-processing code of PDS
/// template 4.15 when present; ECMWF neighbourhood products dispatch on it.
/// Returns `None` for unmapped tuples; the encoder degrades to
/// (table 3, code 255) with a notice.
pub fn grib1_parameter(
    discipline: u8,
    category: u8,
    number: u8,
    center: u16,
    spatial_type: Option<u8>,
) -> Option<(u8, u8)> {
    if discipline == 0 && category == 19 && center == 74 && (20..=22).contains(&number) {
        let code = match (number, spatial_type?) {
            (20, 0) => 168,
            (20, 2) => 169,
            (21, 0) => 170,
            (21, 2) => 171,
            (22, 0) => 172,
            (22, 2) => 173,
            _ => return None,
        };
        return Some((3, code));
    }
    if discipline == 0 && category == 7 && matches!(number, 192 | 193 | 194) {
        // one-to-one rows reconstructed from a structurally suspect region
        // of the reference tables
        warn!(
            "stability-index parameter number {} uses a reconstructed mapping",
            number
        );
    }
    REVERSE
        .iter()
        .find(|row| {
            row.0 == discipline
                && row.1 == category
                && row.2 == number
                && (row.3 == ANY || row.3 == center)
        })
        .map(|row| row.4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wmo_rows_translate_both_ways() {
        assert_eq!(grib2_parameter(11, 34, 2), Some((0, 0, 0)));
        assert_eq!(grib2_parameter(61, 34, 2), Some((0, 1, 8)));
        assert_eq!(grib1_parameter(0, 0, 0, 34, None), Some((3, 11)));
        assert_eq!(grib1_parameter(0, 1, 8, 34, None), Some((3, 61)));
        assert_eq!(grib1_parameter(10, 4, 3, 98, None), Some((3, 88)));
    }

    #[test]
    fn center_rows_gate_on_the_center() {
        // NCEP CAPE lives in the local range
        assert_eq!(grib1_parameter(0, 7, 6, 7, None), Some((3, 157)));
        assert_eq!(grib1_parameter(0, 7, 6, 98, None), None);
        assert_eq!(grib1_parameter(0, 1, 192, 7, None), Some((3, 140)));
        assert_eq!(grib1_parameter(0, 1, 192, 74, None), None);
        // ECMWF total column water vapour override
        assert_eq!(grib2_parameter(1, 98, 228), Some((0, 7, 7)));
        assert_eq!(grib2_parameter(1, 98, 2), Some((0, 3, 0)));
    }

    #[test]
    fn spatially_processed_rows_need_the_processing_type() {
        assert_eq!(grib1_parameter(0, 19, 20, 74, Some(0)), Some((3, 168)));
        assert_eq!(grib1_parameter(0, 19, 20, 74, Some(2)), Some((3, 169)));
        assert_eq!(grib1_parameter(0, 19, 20, 74, None), None);
        assert_eq!(grib1_parameter(0, 19, 20, 7, None), None);
    }

    #[test]
    fn unmapped_tuples_are_none() {
        assert_eq!(grib2_parameter(127, 7, 2), None);
        assert_eq!(grib1_parameter(0, 13, 0, 7, None), None);
        assert_eq!(grib1_parameter(209, 0, 0, 7, None), None);
    }
}
