//! Sample robot descriptions.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Single link with a box visual.
pub const SINGLE_BOX_URDF: &str = r#"<?xml version="1.0"?>
<robot name="single_box">
  <link name="base">
    <visual>
      <geometry><box size="2 1 1"/></geometry>
    </visual>
  </link>
</robot>
"#;

/// Base, two revolute joints about Y and a fixed end effector.
///
/// With all joints at zero the end effector sits at (0, 0, 0.6).
pub const TWO_LINK_ARM_URDF: &str = r#"<?xml version="1.0"?>
<robot name="two_link_arm">
  <material name="orange"><color rgba="1.0 0.5 0.0 1.0"/></material>
  <material name="gray"><color rgba="0.5 0.5 0.5"/></material>

  <link name="base">
    <visual>
      <geometry><cylinder radius="0.1" length="0.1"/></geometry>
      <material name="gray"/>
    </visual>
  </link>
  <link name="upper_arm">
    <visual>
      <origin xyz="0 0 0.15"/>
      <geometry><box size="0.05 0.05 0.3"/></geometry>
      <material name="orange"/>
    </visual>
  </link>
  <link name="forearm">
    <visual>
      <origin xyz="0 0 0.125"/>
      <geometry><box size="0.04 0.04 0.25"/></geometry>
      <material name="orange"/>
    </visual>
  </link>
  <link name="end_effector">
    <visual>
      <geometry><sphere radius="0.03"/></geometry>
      <material><color rgba="0 1 0 1"/></material>
    </visual>
  </link>

  <joint name="shoulder" type="revolute">
    <parent link="base"/>
    <child link="upper_arm"/>
    <origin xyz="0 0 0.05"/>
    <axis xyz="0 1 0"/>
    <limit lower="-1.57" upper="1.57" effort="10" velocity="2"/>
  </joint>
  <joint name="elbow" type="revolute">
    <parent link="upper_arm"/>
    <child link="forearm"/>
    <origin xyz="0 0 0.3"/>
    <axis xyz="0 1 0"/>
  </joint>
  <joint name="tool" type="fixed">
    <parent link="forearm"/>
    <child link="end_effector"/>
    <origin xyz="0 0 0.25"/>
  </joint>
</robot>
"#;

/// A prismatic slider carrying a mesh visual referenced through
/// `package://`.
pub const SLIDER_WITH_MESH_URDF: &str = r#"<?xml version="1.0"?>
<robot name="slider">
  <link name="rail">
    <visual>
      <geometry><box size="4 0.2 0.2"/></geometry>
    </visual>
  </link>
  <link name="carriage">
    <visual>
      <geometry><mesh filename="package://slider/meshes/carriage.obj" scale="0.5"/></geometry>
      <material name="steel"><color rgba="0.6 0.6 0.7 1"/></material>
    </visual>
  </link>
  <joint name="slide" type="prismatic">
    <parent link="rail"/>
    <child link="carriage"/>
    <axis xyz="1 0 0"/>
    <limit lower="-2" upper="2"/>
  </joint>
</robot>
"#;

/// Every field-level defect the parser recovers from.
pub const MALFORMED_FIELDS_URDF: &str = r#"<?xml version="1.0"?>
<robot name="malformed">
  <material name="broken"><color rgba="abc"/></material>
  <link name="base">
    <visual>
      <origin xyz="1 two 3"/>
      <geometry><box size="x y z"/></geometry>
      <material name="nonexistent"/>
    </visual>
  </link>
  <link name="arm">
    <visual>
      <geometry><cylinder radius="thin"/></geometry>
      <material name="broken"/>
    </visual>
  </link>
  <link name="blob">
    <visual>
      <geometry><torus/></geometry>
    </visual>
  </link>
  <joint name="j1" type="revolute">
    <parent link="base"/>
    <child link="arm"/>
    <axis xyz="not an axis"/>
  </joint>
  <joint name="j2" type="fixed">
    <parent link="arm"/>
    <child link="blob"/>
  </joint>
</robot>
"#;

/// A root chain plus an island that no joint connects to.
pub const DISCONNECTED_URDF: &str = r#"<?xml version="1.0"?>
<robot name="disconnected">
  <link name="base"><visual><geometry><sphere radius="0.5"/></geometry></visual></link>
  <link name="arm"><visual><geometry><sphere radius="0.2"/></geometry></visual></link>
  <link name="floating_a"/>
  <link name="floating_b"><visual><geometry><box size="1 1 1"/></geometry></visual></link>
  <joint name="j" type="continuous">
    <parent link="base"/>
    <child link="arm"/>
    <origin xyz="1 0 0"/>
  </joint>
  <joint name="island" type="fixed">
    <parent link="floating_a"/>
    <child link="floating_b"/>
  </joint>
  <joint name="back" type="fixed">
    <parent link="floating_b"/>
    <child link="floating_a"/>
  </joint>
</robot>
"#;

/// Not a robot description at all.
pub const NOT_URDF: &str = r#"<?xml version="1.0"?><scene><node/></scene>"#;

/// Write `contents` to `dir/name`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    Ok(path)
}

/// A temporary directory holding `contents` as `robot.urdf`.
///
/// Keep the returned [`TempDir`] alive for as long as the path is used.
pub fn temp_description(contents: &str) -> io::Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "robot.urdf", contents)?;
    Ok((dir, path))
}
