// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

/// Codes above this are fatal; codes from 1 up to it are warnings.
pub const FATAL_THRESHOLD: i32 = 100;

const MESSAGES: &[(i32, &str)] = &[
    // system and state
    (101, "Insufficient memory"),
    (102, "No network data available"),
    (103, "Hydraulics not initialized"),
    (104, "No hydraulics results available"),
    (105, "No water quality results available"),
    (106, "No results to report on"),
    (107, "Hydraulics supplied from external file"),
    (108, "Cannot use external file while hydraulics solver is active"),
    (109, "Cannot change time parameter when solver is active"),
    // solver
    (110, "Cannot solve hydraulic equations - system may be unstable"),
    (111, "Cannot solve water quality transport equations"),
    (112, "Cannot solve water quality equilibrium equations"),
    (120, "Cannot solve water quality equations"),
    // input file
    (200, "One or more errors in input file"),
    (201, "Syntax error in input file"),
    (202, "Cannot open input file"),
    (203, "Cannot open report file"),
    (204, "Cannot open binary output file"),
    (205, "Cannot open hydraulics file"),
    (206, "Hydraulics file does not match network data"),
    (207, "Cannot read hydraulics file"),
    (208, "Cannot save results to file"),
    (209, "Cannot save results to report file"),
    // input data
    (210, "Invalid format (too few fields)"),
    (211, "Invalid format (too many fields)"),
    (212, "Duplicate ID label"),
    (213, "Undefined node in link data"),
    (214, "Undefined node in control data"),
    (215, "Undefined link in control data"),
    (216, "Undefined pattern in demand data"),
    (217, "Undefined curve in pump data"),
    (218, "Invalid pump curve"),
    (219, "Invalid valve data"),
    (220, "Invalid pipe data"),
    (221, "Invalid node data"),
    (222, "Invalid link data"),
    (223, "Invalid curve data"),
    (224, "Invalid pattern data"),
    (225, "Invalid time parameter"),
    (226, "Invalid option parameter"),
    (227, "Invalid quality parameter"),
    (228, "Invalid source quality parameter"),
    (229, "Invalid reaction coefficient"),
    (230, "Invalid energy parameter"),
    (231, "Invalid hydraulic option"),
    (232, "Invalid quality option"),
    (233, "Invalid rule syntax"),
    (234, "Invalid rule clause"),
    (235, "Invalid rule priority"),
    (236, "Invalid control statement"),
    (237, "Invalid mixing model"),
    (238, "Invalid tank volume curve"),
    (239, "Invalid demand model"),
    // runtime and lookup
    (240, "Undefined node - node ID not found in network"),
    (241, "Undefined link - link ID not found in network"),
    (242, "Undefined time pattern"),
    (243, "Undefined curve"),
    (244, "Undefined simple control"),
    (245, "Undefined rule-based control"),
    (246, "Invalid node property code"),
    (247, "Invalid link property code"),
    (248, "Invalid time parameter code"),
    (249, "Invalid option parameter code"),
    (250, "Invalid property code"),
    (251, "Invalid curve type"),
    (252, "Invalid demand category"),
    (253, "Invalid node type"),
    (254, "Invalid link type"),
    (255, "Invalid pump type"),
    (256, "Invalid action code"),
    (257, "Invalid analysis statistic"),
    (258, "Invalid time parameter"),
    (259, "Invalid object type"),
    (260, "Undefined object"),
    (261, "Illegal object index"),
    (262, "Undefined demand category"),
    (263, "Invalid demand category"),
    (264, "Invalid curve index"),
    (265, "Invalid pattern index"),
    (266, "Invalid time period"),
];

/// Human-readable text for an engine status code.
pub fn describe(code: i32) -> String {
    if code == 0 {
        return "Success".to_string();
    }

    match MESSAGES.binary_search_by_key(&code, |(c, _)| *c) {
        Ok(pos) => MESSAGES[pos].1.to_string(),
        Err(_) => format!("Unknown error code: {}", code),
    }
}

pub fn is_fatal(code: i32) -> bool {
    code > FATAL_THRESHOLD
}
