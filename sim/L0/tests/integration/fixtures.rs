//! Model namespaces shaped like the catalogued robots.

use sim_types::{ModelNamespace, NamespaceBuilder};

const SIDES: [&str; 2] = ["left", "right"];

fn terrain(b: &mut NamespaceBuilder) {
    b.add_body("terrain", "world").unwrap();
    b.add_geom("terrain_collision", "terrain").unwrap();
}

/// Unitree G1 with 23 actuated joints and a floating base, on terrain.
///
/// Each joint sits on the link it moves, named after it (`left_knee_joint`
/// on `left_knee_link`). Feet carry seven sphere geoms each.
pub fn g1_namespace() -> ModelNamespace {
    let mut b = NamespaceBuilder::new();
    terrain(&mut b);

    b.enter_entity("robot");
    b.add_body("pelvis", "world").unwrap();
    b.add_joint("floating_base_joint", "pelvis").unwrap();
    b.add_geom("pelvis_collision", "pelvis").unwrap();

    for side in SIDES {
        let mut parent = "pelvis".to_owned();
        for joint in ["hip_pitch", "hip_roll", "hip_yaw", "knee", "ankle_pitch", "ankle_roll"] {
            let link = format!("{side}_{joint}_link");
            b.add_body(&link, &parent).unwrap();
            b.add_joint(&format!("{side}_{joint}_joint"), &link).unwrap();
            parent = link;
        }
        b.add_geom(&format!("{side}_thigh_collision"), &format!("{side}_hip_yaw_link"))
            .unwrap();
        b.add_geom(&format!("{side}_shin_collision"), &format!("{side}_knee_link"))
            .unwrap();
        let foot = format!("{side}_ankle_roll_link");
        for i in 1..=7 {
            b.add_geom(&format!("{side}_foot{i}_collision"), &foot).unwrap();
        }
        b.add_site(&format!("{side}_foot"), &foot).unwrap();
    }

    b.add_body("torso_link", "pelvis").unwrap();
    b.add_joint("waist_yaw_joint", "torso_link").unwrap();
    b.add_geom("torso_collision", "torso_link").unwrap();
    b.add_site("imu", "torso_link").unwrap();

    for side in SIDES {
        let mut parent = "torso_link".to_owned();
        for joint in ["shoulder_pitch", "shoulder_roll", "shoulder_yaw", "elbow", "wrist_roll"] {
            let link = format!("{side}_{joint}_link");
            b.add_body(&link, &parent).unwrap();
            b.add_joint(&format!("{side}_{joint}_joint"), &link).unwrap();
            parent = link;
        }
        b.add_geom(&format!("{side}_elbow_collision"), &format!("{side}_elbow_link"))
            .unwrap();
        b.add_geom(&format!("{side}_hand_collision"), &parent).unwrap();
    }
    b.build()
}

/// Unitree Go2 with 12 actuated joints, on terrain.
pub fn go2_namespace() -> ModelNamespace {
    let mut b = NamespaceBuilder::new();
    terrain(&mut b);

    b.enter_entity("robot");
    b.add_body("base_link", "world").unwrap();
    b.add_geom("base_collision", "base_link").unwrap();
    b.add_geom("base_collision2", "base_link").unwrap();

    for leg in ["FL", "FR", "RL", "RR"] {
        let mut parent = "base_link".to_owned();
        for part in ["hip", "thigh", "calf"] {
            let link = format!("{leg}_{part}");
            b.add_body(&link, &parent).unwrap();
            b.add_joint(&format!("{leg}_{part}_joint"), &link).unwrap();
            b.add_geom(&format!("{leg}_{part}_collision"), &link).unwrap();
            parent = link;
        }
        b.add_geom(&format!("{leg}_foot_collision"), &parent).unwrap();
        b.add_site(leg, &parent).unwrap();
    }
    b.build()
}
