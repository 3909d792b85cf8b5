/*!

This is the long-form manual for `repair_priority` and `roadrank`.

## How areas are ranked

Ranking the damaged areas happens in two steps:

1. The criteria are weighted from pairwise judgments (Analytic Network Process).
2. The areas are scored against the weighted criteria (TOPSIS).

### Weighting the criteria

Each pair of criteria receives one judgment on the usual 1-9 scale:

| value | meaning                        |
|-------|--------------------------------|
| 1     | equal importance               |
| 3     | moderate importance            |
| 5     | strong importance              |
| 7     | very strong importance         |
| 9     | extreme importance             |

Values are always positive. When the second criterion of the pair is the more important one,
the judgment carries the `bOverA` preference instead of a negative or fractional value.
For `n` criteria, exactly `n (n - 1) / 2` judgments are needed.

The weights are the principal eigenvector of the comparison matrix, found by power iteration.
The consistency ratio tells how far the judgments are from being transitive. Above `0.10`,
the judgments are usually worth revisiting, but the weights are computed anyway.

### Interdependencies

Criteria are rarely independent: a busy road tends to collect more reports. A second set of
judgments (`interdependency`) records how much the priority of one criterion is influenced by
another. When present, it must be complete as well. The weights are then adjusted through
the limit of the supermatrix. Without it, the analysis is a plain AHP.

### Scoring the areas

Each area is described by one value per criterion. All the criteria are considered
benefits (a larger value means a more urgent repair). The score is the relative closeness
to the ideal area, between 0 and 1.

## Input formats

The decision matrix can be given:
* inline, through the `areas` section of the configuration
* `csv` a CSV file, one row per area
* `xlsx` an Excel worksheet, one row per area

### csv

```text
id,traffic,reports,width
main-street,3,12,7.5
river-road,1,3,5.0
```

The `id` column is optional. If it is missing, areas are named after the file and the line number.

## Configuration

The program accepts a configuration file in JSON:

```text
{
  "outputSettings": { "analysisName": "Spring campaign", "createdBy": "roads-team" },
  "criteria": [
    { "id": "traffic", "name": "Traffic volume", "attribute": "trafficVolume" },
    { "id": "reports", "name": "Report count", "attribute": "reportCount" }
  ],
  "comparisons": [
    { "criterionA": "traffic", "criterionB": "reports", "comparisonType": "criteria", "value": 3 }
  ],
  "areas": [
    { "id": "main-street", "trafficVolume": "high", "reportCount": 12, "roadWidth": 7.5 }
  ],
  "rules": { "maxIterations": 100, "limitSquarings": 20 }
}
```

Options for `rules` (all optional):
 - `maxIterations` (default 100): ceiling of the eigenvector iteration.
 - `tolerance` (default 1e-10): convergence tolerance of the eigenvector iteration.
 - `limitSquarings` (default 20, minimum 20): squarings of the supermatrix.
 - `limitTolerance` (default 1e-9): convergence tolerance of the limit matrix.
 - `consistencyThreshold` (default 0.10).

 */
