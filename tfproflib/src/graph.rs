//! Gantt-chart output for a parsed log.
//!
//! Produces a gnuplot script that draws one bar per resource, spanning
//! from its start event to its completion event on the global event axis.
//! The output is meant to be piped into gnuplot.

use crate::model::{ParsedLog, Status};

/// Give never-completed resources a completion event.
///
/// Failed or unfinished resources keep the `-1` sentinel for their
/// completion event; on the chart they should show as a bar running to
/// the end of the run, so they get the maximum completion event seen.
pub fn repair_unfinished(log: &ParsedLog) -> ParsedLog {
    let max_event = log
        .resources
        .values()
        .map(|m| m.modification_completed_event)
        .max()
        .unwrap_or(0);

    let mut repaired = log.clone();
    for metric in repaired.resources.values_mut() {
        if metric.after_status != Status::Created && metric.after_status != Status::Multiple {
            metric.modification_completed_event = max_event;
        }
    }
    repaired
}

/// Render the gnuplot script for a log.
pub fn gnuplot_script(log: &ParsedLog, width: u32, height: u32, out_file: &str) -> String {
    // Chronological top-to-bottom ordering reads best on the chart.
    let mut names: Vec<&String> = log.resources.keys().collect();
    names.sort_by_key(|name| {
        std::cmp::Reverse(log.resources[*name].modification_started_event)
    });

    let mut data = String::new();
    for name in names {
        let metric = &log.resources[name];
        // Underscores would be read as subscripts by gnuplot.
        let label = name.replace('_', r"\\\_").replace('"', "'");
        data.push_str(&format!(
            "{} {} {} {}\n",
            label,
            metric.modification_started_event,
            metric.modification_completed_event,
            metric.after_status
        ));
    }

    format!(
        r##"# gnuplot script for a Terraform run Gantt chart
reset
set termoption dash
set terminal pngcairo background "#ffffff" fontscale 1.0 dashed size {width}, {height}

# Output colors
green = 0x49A720
red = 0xD32F2F

# resource  start  end  status
$DATA << EOD
{data}EOD

set output "{out_file}"

# Grid and tics
set mxtics
set mytics
set grid xtics
set grid ytics
set grid mxtics

# Create list of keys
List = ''
set table $Dummy
    plot $DATA u (List=List.'"'.strcol(1).'" ',NaN) w table
unset table

# Lookup/index and color functions
Lookup(s) = (Index = NaN, sum [i=1:words(List)] \
    (Index = s eq word(List,i) ? i : Index,0), Index)
Color(s) = (s eq "Created" || s eq "Multiple") ? green : red

set xrange [-1:]
set yrange [0.5:words(List)+0.5]

set label "Created" at screen 0.86,0.93 tc rgb green
set label "Other" at screen 0.86,0.89 tc rgb red

plot $DATA u 2:(Idx=Lookup(strcol(1))): 3 : 2 :(Idx-0.2):(Idx+0.2): \
    (Color(strcol(4))): ytic(strcol(1)) w boxxyerror fill solid 0.7 lw 2.0 lc rgb var notitle
"##
    )
}
